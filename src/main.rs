//! Timewarp CLI
//!
//! Usage:
//!   timewarp --line "gain=0.9 coupling=0.8 error=0.1"   # Single update
//!   timewarp --line "gain=0.9" --steps 20               # Repeated updates
//!   timewarp --interactive                              # Interactive mode
//!   timewarp --serve                                    # HTTP API server
//!   timewarp --line "gain=0.9" --json                   # JSON output

use clap::Parser;
use colored::Colorize;
use std::io::{self, BufRead, Write};

use timewarp::core::{run_server, SignalParser, TimewarpKernel};
use timewarp::types::{FlowBand, KernelParams, TickReport};
use timewarp::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "timewarp",
    version = VERSION,
    about = "Timewarp - smooth control-loop signals into a subjective time scale",
    long_about = "Timewarp converts five normalized control-loop signals into two\n\
                  smoothed scores (absorption, timelessness) and a derived\n\
                  subjective time-scale factor.\n\n\
                  Signals (all optional, clamped to [0,1]):\n  \
                  loopGain (gain, g)          default 0\n  \
                  coupling (c)                default 0\n  \
                  predictionError (error, e)  default 1\n  \
                  novelty (n)                 default 0.5\n  \
                  activation (a)              default 0.5\n\n\
                  Bands (by timelessness):\n  \
                  BASELINE  - perceived time runs normally\n  \
                  ENGAGED   - loop engagement building\n  \
                  ABSORBED  - sustained engagement\n  \
                  TIMELESS  - maximal time distortion"
)]
struct Args {
    /// Signal line to evaluate, e.g. "gain=0.9 coupling=0.8 error=0.1"
    #[arg(short, long)]
    line: Option<String>,

    /// Repeat the signal line this many times (shows the smoothing settle)
    #[arg(long, default_value_t = 1)]
    steps: u32,

    /// Interactive mode - read signal lines from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,

    /// Show signal breakdown
    #[arg(long)]
    verbose: bool,

    /// Override the smoothing rate tau
    #[arg(long)]
    tau: Option<f64>,

    /// Override the minimum subjective time scale
    #[arg(long)]
    min_scale: Option<f64>,
}

impl Args {
    fn kernel_params(&self) -> KernelParams {
        let mut params = KernelParams::default();
        if let Some(tau) = self.tau {
            params.tau = tau;
        }
        if let Some(min_scale) = self.min_scale {
            params.min_scale = min_scale;
        }
        params
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.serve {
        run_serve(&args).await;
    } else if args.interactive {
        run_interactive(&args);
    } else if let Some(ref line) = args.line {
        run_line(line, &args);
    } else {
        // Default to interactive if no mode specified
        run_interactive(&args);
    }
}

/// Evaluate one signal line, optionally repeated
fn run_line(line: &str, args: &Args) {
    let parser = SignalParser::new();
    let mut kernel = TimewarpKernel::new(args.kernel_params());

    let parsed = parser.parse(line);
    warn_ignored(&parsed.ignored, args.no_color);

    for _ in 0..args.steps.max(1) {
        let snapshot = kernel.update(parsed.input);
        let report = TickReport::new(kernel.update_count(), &snapshot);
        print_report(&report, &kernel, args);
    }
}

/// Interactive mode: one update per input line
fn run_interactive(args: &Args) {
    let parser = SignalParser::new();
    let mut kernel = TimewarpKernel::new(args.kernel_params());

    print_header(args.no_color);
    println!("Enter signal lines like: gain=0.9 coupling=0.8 error=0.1");
    println!("Commands: 'state' (export), 'reset', 'quit'");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let prompt = format_prompt(&kernel, args.no_color);
        print!("{}", prompt);
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("\nSession ended. Updates: {}", kernel.update_count());
            break;
        }
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("reset") {
            kernel.reset();
            let msg = "kernel reset to floors";
            if args.no_color {
                println!("  {}", msg);
            } else {
                println!("  {}", msg.cyan());
            }
            continue;
        }
        if line.eq_ignore_ascii_case("state") {
            match serde_json::to_string_pretty(&kernel.export_state()) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("state export failed: {}", e),
            }
            continue;
        }

        let parsed = parser.parse(line);
        if !parsed.any_recognized() && parsed.ignored.is_empty() {
            let msg = "no key=value pairs recognized (try 'gain=0.9')";
            if args.no_color {
                println!("  {}", msg);
            } else {
                println!("  {}", msg.yellow());
            }
            continue;
        }
        warn_ignored(&parsed.ignored, args.no_color);

        let snapshot = kernel.update(parsed.input);
        let report = TickReport::new(kernel.update_count(), &snapshot);
        print_report(&report, &kernel, args);
    }
}

/// Print one tick report in the selected format
fn print_report(report: &TickReport, kernel: &TimewarpKernel, args: &Args) {
    if args.json {
        match serde_json::to_string(report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("report serialization failed: {}", e),
        }
    } else if args.verbose {
        print_verbose(report, kernel, args.no_color);
    } else if args.no_color {
        println!("{}", report.to_parseable_string());
    } else {
        println!("{}", report.to_terminal_string());
    }
}

/// Warn about unrecognized keys
fn warn_ignored(ignored: &[String], no_color: bool) {
    if ignored.is_empty() {
        return;
    }
    let msg = format!("ignored unknown keys: {}", ignored.join(", "));
    if no_color {
        println!("  {}", msg);
    } else {
        println!("  {}", msg.yellow());
    }
}

/// Print header
fn print_header(no_color: bool) {
    let title = format!("Timewarp v{} - Interactive", VERSION);
    if no_color {
        println!("========================================");
        println!("  {}", title);
        println!("========================================");
    } else {
        println!("{}", "========================================".bold());
        println!("  {}", title.bold());
        println!("{}", "========================================".bold());
    }
    println!();
}

/// Format interactive prompt with current band and scale
fn format_prompt(kernel: &TimewarpKernel, no_color: bool) -> String {
    let band = FlowBand::from_timelessness(kernel.timelessness());
    if no_color {
        format!("[{} | dt×{:.3}] > ", band, kernel.subjective_dt_scale())
    } else {
        format!(
            "{}{} [{} | dt×{:.3}]{} > ",
            band.color_code(),
            band.emoji(),
            band,
            kernel.subjective_dt_scale(),
            FlowBand::color_reset()
        )
    }
}

/// Print verbose breakdown box
fn print_verbose(report: &TickReport, kernel: &TimewarpKernel, no_color: bool) {
    let color = if no_color { "" } else { report.band.color_code() };
    let reset = if no_color { "" } else { FlowBand::color_reset() };
    let last = kernel.last();
    let p = kernel.params();

    println!("{}┌───────────────────────────────────────┐{}", color, reset);
    println!(
        "{}│ step {} | band {}{}",
        color, report.step, report.band, reset
    );
    println!("{}├───────────────────────────────────────┤{}", color, reset);
    println!("{}│ Signals:{}", color, reset);
    println!(
        "{}│   loopGain:        {:.4} (w={:.2}){}",
        color, last.loop_gain, p.w_gain, reset
    );
    println!(
        "{}│   coupling:        {:.4} (w={:.2}){}",
        color, last.coupling, p.w_coupling, reset
    );
    println!(
        "{}│   predictionError: {:.4}{}",
        color, last.prediction_error, reset
    );
    println!(
        "{}│   smoothness:      {:.4} (w={:.2}){}",
        color, last.smoothness, p.w_smoothness, reset
    );
    println!(
        "{}│   novelty:         {:.4} (w={:.2}){}",
        color, last.novelty, p.w_novelty, reset
    );
    println!(
        "{}│   activation:      {:.4} (w={:.2}){}",
        color, last.activation, p.w_activation, reset
    );
    println!("{}├───────────────────────────────────────┤{}", color, reset);
    println!(
        "{}│ absorption:   {:.4}{}",
        color, report.absorption, reset
    );
    println!(
        "{}│ timelessness: {:.4}{}",
        color, report.timelessness, reset
    );
    println!(
        "{}│ dt scale:     {:.4}{}",
        color, report.subjective_dt_scale, reset
    );
    println!("{}└───────────────────────────────────────┘{}", color, reset);
}

/// Run HTTP API server
async fn run_serve(args: &Args) {
    println!();
    let banner = format!("⧖ Timewarp API Server v{}", VERSION);
    if args.no_color {
        println!("{}", banner);
    } else {
        println!("{}", banner.bold());
    }
    println!();

    if let Err(e) = run_server(&args.addr).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
