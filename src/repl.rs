use crate::prelude::*;
use crate::state::*;

use log::debug;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::time::Duration;

/// Key code delivered for an input line: its first character, or carriage
/// return when the line is empty.
pub fn key_code(line: &str) -> Xint {
    line.chars().next().map_or(13, |c| c as Xint)
}

/// Serve suspensions until the line completes. Timers sleep the thread,
/// keys come from `read_key`; `None` from it leaves the line suspended.
pub fn serve_events<F>(xs: &mut State, mut status: Xresult1<Status>, mut read_key: F) -> Xresult1<Status>
where
    F: FnMut() -> Option<Xint>,
{
    loop {
        status = match status {
            Ok(Status::Suspended(Wait::Key)) => match read_key() {
                Some(code) => xs.deliver_key(code),
                None => break status,
            },
            Ok(Status::Suspended(Wait::Timer(ms))) => {
                debug!("sleep {} ms", ms);
                std::thread::sleep(Duration::from_millis(ms.max(0) as u64));
                xs.deliver_timer_elapsed()
            }
            _ => break status,
        }
    }
}

/// Run a source file line by line, serving `key` from stdin.
pub fn run_file(xs: &mut State, path: &str) -> Xresult1<Status> {
    let src = crate::file::read_source_file(path)?;
    let mut result = Ok(Status::Ok);
    for line in src.lines() {
        let status = xs.read_line(line);
        result = serve_events(xs, status, read_stdin_key);
        if let Ok(Status::Suspended(_)) = result {
            break;
        }
    }
    xs.print("\n");
    result
}

pub fn read_stdin_key() -> Option<Xint> {
    let mut buf = String::new();
    match std::io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(key_code(buf.trim_end_matches(&['\r', '\n'][..]))),
    }
}

pub fn console_repl(xs: &mut State, load_history: bool) {
    let mut rl = Editor::<()>::new();
    if load_history {
        let _ = rl.load_history("history.txt");
    }
    loop {
        let readline = rl.readline("");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str());
                let status = xs.read_line(line.as_str());
                let status = serve_events(xs, status, || match rl.readline("key> ") {
                    Ok(s) => Some(key_code(&s)),
                    Err(_) => None,
                });
                if let Ok(Status::Suspended(_)) = status {
                    println!("CTRL-C");
                    break;
                }
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    if load_history {
        if let Err(e) = rl.save_history("history.txt") {
            println!("history save failed: {:}", e);
        }
    }
}

#[test]
fn test_key_code() {
    assert_eq!(13, key_code(""));
    assert_eq!(65, key_code("A"));
    assert_eq!(32, key_code(" x"));
}

#[test]
fn test_serve_events() {
    let mut xs = State::boot().unwrap();
    xs.capture_stdout();
    let mut keys = vec![66, 65];
    let status = xs.read_line("key 0 sleep key . .");
    let status = serve_events(&mut xs, status, || keys.pop());
    assert_eq!(Ok(Status::Ok), status);
    assert_eq!("66 65  ok", xs.take_console());
    let status = xs.read_line("key");
    let status = serve_events(&mut xs, status, || None);
    assert_eq!(Ok(Status::Suspended(Wait::Key)), status);
}
