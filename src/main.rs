use xforth::prelude::*;
use xforth::repl::*;

use getopts::Options;

fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [options]", program);
    print!("{}", opts.usage(&brief));
}

fn main() {
    pretty_env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    let mut opts = Options::new();
    opts.optopt("s", "", "run script file line by line", "FILE");
    opts.optopt("e", "", "evaluate one line", "CODE");
    opts.optflag("n", "", "exit instead of starting the repl");
    opts.optflag("H", "", "keep repl history in history.txt");
    opts.optflag("h", "help", "print this help");
    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            print_usage(&args[0], &opts);
            std::process::exit(2);
        }
    };
    if matches.opt_present("h") {
        print_usage(&args[0], &opts);
        return;
    }

    let mut xs = match Xstate::boot() {
        Ok(xs) => xs,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    if let Some(filename) = matches.opt_str("s") {
        if let Err(Xerr::IOError { filename, reason }) = run_file(&mut xs, &filename) {
            eprintln!("{}: {}", filename, reason);
            std::process::exit(1);
        }
    }
    if let Some(code) = matches.opt_str("e") {
        let status = xs.read_line(&code);
        let _ = serve_events(&mut xs, status, read_stdin_key);
        println!();
    }
    if !matches.opt_present("n") {
        console_repl(&mut xs, matches.opt_present("H"));
    }
}
