//! Console accumulate/dispatch tests

use core::fmt;

use serial_echo::config::{ConsoleConfig, OverflowPolicy};
use serial_echo::console::{Console, ConsoleError, Dispatch, LineState};
use serial_echo::logging::{LogLevel, LogStream};

fn feed(console: &mut Console<'_>, bytes: &[u8]) {
    for &b in bytes {
        assert!(console.on_byte(b));
    }
}

/// Feed one line and dispatch it, returning everything printed
fn run_line(console: &mut Console<'_>, bytes: &[u8]) -> (Option<Dispatch>, String) {
    feed(console, bytes);
    let mut out = String::new();
    let dispatch = console.poll_and_dispatch(&mut out).unwrap();
    (dispatch, out)
}

#[test]
fn test_initial_state() {
    let log = LogStream::new();
    let console = Console::with_log(&ConsoleConfig::default(), &log);

    assert_eq!(console.state(), LineState::Accumulating);
    assert!(console.pending().is_empty());
}

#[test]
fn test_help() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);

    let (dispatch, out) = run_line(&mut console, b"HELP\n");

    assert_eq!(dispatch, Some(Dispatch::Command("HELP")));
    assert_eq!(out, "Received command: 'HELP'\r\nAvailable commands: HELP, TEST, HELLO\r\n");
}

#[test]
fn test_test_and_hello() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);

    let (_, out) = run_line(&mut console, b"TEST\n");
    assert_eq!(out, "Received command: 'TEST'\r\nTest response - ESP32 is working!\r\n");

    let (_, out) = run_line(&mut console, b"HELLO\n");
    assert_eq!(out, "Received command: 'HELLO'\r\nHello from ESP32!\r\n");
}

#[test]
fn test_lowercase_is_unknown() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);

    let (dispatch, out) = run_line(&mut console, b"help\n");

    assert_eq!(dispatch, Some(Dispatch::Unknown));
    assert_eq!(out, "Received command: 'help'\r\nUnknown command: help\r\n");
}

#[test]
fn test_surrounding_whitespace_trimmed() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);

    let (_, padded) = run_line(&mut console, b"  TEST  \n");
    let (_, plain) = run_line(&mut console, b"TEST\n");

    assert_eq!(padded, plain);
}

#[test]
fn test_crlf_terminator() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);

    let (dispatch, _) = run_line(&mut console, b"HELLO\r\n");
    assert_eq!(dispatch, Some(Dispatch::Command("HELLO")));
}

#[test]
fn test_partial_input_produces_nothing() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);

    feed(&mut console, b"TES");
    let mut out = String::new();

    assert_eq!(console.poll_and_dispatch(&mut out), Ok(None));
    assert!(out.is_empty());
    assert_eq!(console.pending(), b"TES");

    feed(&mut console, b"T\n");
    assert_eq!(console.poll_and_dispatch(&mut out), Ok(Some(Dispatch::Command("TEST"))));
    assert!(out.ends_with("Test response - ESP32 is working!\r\n"));
}

#[test]
fn test_back_to_back_commands() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);
    let mut out = String::new();
    let mut dispatched = Vec::new();

    for &b in b"TEST\nHELLO\n" {
        if console.is_ready() {
            dispatched.push(console.poll_and_dispatch(&mut out).unwrap());
        }
        console.on_byte(b);
    }
    dispatched.push(console.poll_and_dispatch(&mut out).unwrap());

    assert_eq!(
        dispatched,
        [Some(Dispatch::Command("TEST")), Some(Dispatch::Command("HELLO"))]
    );
    assert_eq!(
        out,
        "Received command: 'TEST'\r\nTest response - ESP32 is working!\r\n\
         Received command: 'HELLO'\r\nHello from ESP32!\r\n"
    );
}

#[test]
fn test_ready_rejects_bytes_until_dispatch() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);

    feed(&mut console, b"TEST\n");
    assert_eq!(console.state(), LineState::Ready);
    assert!(!console.on_byte(b'X'));
    assert_eq!(console.pending(), b"TEST");

    let mut out = String::new();
    console.poll_and_dispatch(&mut out).unwrap();

    assert_eq!(console.state(), LineState::Accumulating);
    assert!(console.pending().is_empty());
    assert!(console.on_byte(b'X'));
}

#[test]
fn test_empty_line_is_unknown() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);

    let (dispatch, out) = run_line(&mut console, b"\n");

    assert_eq!(dispatch, Some(Dispatch::Unknown));
    assert_eq!(out, "Received command: ''\r\nUnknown command: \r\n");
}

#[test]
fn test_invalid_utf8_echoed_with_replacement() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);

    let (dispatch, out) = run_line(&mut console, b"T\xffST\n");

    assert_eq!(dispatch, Some(Dispatch::Unknown));
    assert_eq!(out, "Received command: 'T\u{FFFD}ST'\r\nUnknown command: T\u{FFFD}ST\r\n");
}

#[test]
fn test_overflow_discard() {
    let log = LogStream::new();
    let config = ConsoleConfig { max_line_len: 8, ..ConsoleConfig::default() };
    let mut console = Console::with_log(&config, &log);

    let (dispatch, out) = run_line(&mut console, b"HELLO HELLO HELLO\n");

    assert_eq!(dispatch, Some(Dispatch::Discarded { dropped: 9 }));
    assert_eq!(out, "Line too long (max 8 bytes), discarded\r\n");
    assert_eq!(console.state(), LineState::Accumulating);

    let entry = log.drain().unwrap();
    assert_eq!(entry.level, LogLevel::Warn);
    assert!(entry.message().contains("line too long"));

    // Next line is unaffected
    let (dispatch, _) = run_line(&mut console, b"TEST\n");
    assert_eq!(dispatch, Some(Dispatch::Command("TEST")));
}

#[test]
fn test_line_at_limit_with_crlf_dispatches() {
    let log = LogStream::new();
    let config = ConsoleConfig { max_line_len: 4, ..ConsoleConfig::default() };
    let mut console = Console::with_log(&config, &log);

    let (dispatch, out) = run_line(&mut console, b"TEST\r\n");

    assert_eq!(dispatch, Some(Dispatch::Command("TEST")));
    assert_eq!(out, "Received command: 'TEST'\r\nTest response - ESP32 is working!\r\n");
    assert!(log.drain().map_or(true, |e| e.level != LogLevel::Warn));
}

#[test]
fn test_default_limit_line_with_trailing_whitespace() {
    let log = LogStream::new();
    let config = ConsoleConfig::default();
    let mut console = Console::with_log(&config, &log);

    let mut line = vec![b'A'; config.max_line_len];
    line.extend_from_slice(b"  \t\r\n");
    let (dispatch, out) = run_line(&mut console, &line);

    assert_eq!(dispatch, Some(Dispatch::Unknown));
    assert!(out.starts_with("Received command: 'AAAA"));
    assert!(!out.contains("Line too long"));
}

#[test]
fn test_content_after_dropped_whitespace_overflows() {
    let log = LogStream::new();
    let config = ConsoleConfig { max_line_len: 4, ..ConsoleConfig::default() };
    let mut console = Console::with_log(&config, &log);

    let (dispatch, out) = run_line(&mut console, b"TEST  X\r\n");

    assert_eq!(dispatch, Some(Dispatch::Discarded { dropped: 3 }));
    assert_eq!(out, "Line too long (max 4 bytes), discarded\r\n");
}

#[test]
fn test_overflow_truncate() {
    let log = LogStream::new();
    let config = ConsoleConfig {
        max_line_len: 5,
        overflow: OverflowPolicy::Truncate,
        ..ConsoleConfig::default()
    };
    let mut console = Console::with_log(&config, &log);

    let (dispatch, out) = run_line(&mut console, b"HELLOXYZ\n");

    assert_eq!(dispatch, Some(Dispatch::Command("HELLO")));
    assert!(out.starts_with("Received command: 'HELLO'\r\n"));
    assert_eq!(log.drain().unwrap().level, LogLevel::Warn);
}

#[test]
fn test_unknown_command_logged() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log).with_clock(|| 42);

    run_line(&mut console, b"FOO\n");

    let entry = log.drain().unwrap();
    assert_eq!(entry.level, LogLevel::Info);
    assert_eq!(entry.timestamp_us, 42);
    assert_eq!(entry.message(), "unknown command (3 bytes)");
}

#[test]
fn test_banner() {
    let log = LogStream::new();
    let console = Console::with_log(&ConsoleConfig::default(), &log);
    let mut out = String::new();

    console.print_banner(&mut out).unwrap();

    assert_eq!(
        out,
        "ESP32 Communication Test\r\nReady for commands!\r\nType HELP for available commands\r\n"
    );
}

/// Sink that fails every write
struct BrokenSink;

impl fmt::Write for BrokenSink {
    fn write_str(&mut self, _: &str) -> fmt::Result {
        Err(fmt::Error)
    }
}

#[test]
fn test_write_failure_still_resets() {
    let log = LogStream::new();
    let mut console = Console::with_log(&ConsoleConfig::default(), &log);

    feed(&mut console, b"TEST\n");

    assert_eq!(console.poll_and_dispatch(&mut BrokenSink), Err(ConsoleError::Output));
    assert_eq!(console.state(), LineState::Accumulating);
    assert!(console.pending().is_empty());
}

#[test]
fn test_error_display() {
    assert_eq!(ConsoleError::Output.to_string(), "E01: output write failed");
    assert_eq!(ConsoleError::LineTooLong.to_string(), "E02: line too long");
}
