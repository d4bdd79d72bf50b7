//! Command-line client for cowling sockets.
//!
//! Opens one socket of the requested kind, attaches it to the given
//! endpoints, then bridges the terminal to the messaging fabric: every line
//! on stdin goes out as a one-frame message, every received message is
//! printed to stdout with its frames separated by spaces.
//!
//! ```text
//! cowling --kind pub --bind 'tcp://*:5555'
//! cowling --kind sub --connect tcp://127.0.0.1:5555 --subscribe weather
//! cowling --kind pull --bind ipc:///tmp/jobs --count 10
//! ```

use std::io::BufRead;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::warn;

use cowling::{Context, Message, PollEvents, Poller, SendOutcome, SocketType};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Pair,
    Pub,
    Sub,
    Req,
    Rep,
    Dealer,
    Router,
    Pull,
    Push,
}

impl From<Kind> for SocketType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Pair => SocketType::Pair,
            Kind::Pub => SocketType::Pub,
            Kind::Sub => SocketType::Sub,
            Kind::Req => SocketType::Req,
            Kind::Rep => SocketType::Rep,
            Kind::Dealer => SocketType::Dealer,
            Kind::Router => SocketType::Router,
            Kind::Pull => SocketType::Pull,
            Kind::Push => SocketType::Push,
        }
    }
}

/// Pipe messages between the terminal and a socket.
///
/// Runs until stdin closes and everything queued has been sent, or until
/// `--count` messages have been received.
#[derive(Debug, Parser)]
#[command(name = "cowling", version)]
struct Args {
    /// Socket kind to drive
    #[arg(long, value_enum)]
    kind: Kind,

    /// Endpoints to bind (repeatable)
    #[arg(long, value_name = "ENDPOINT")]
    bind: Vec<String>,

    /// Endpoints to connect (repeatable)
    #[arg(long, value_name = "ENDPOINT")]
    connect: Vec<String>,

    /// Topics to subscribe to; subscribing kinds default to everything
    #[arg(long, value_name = "TOPIC")]
    subscribe: Vec<String>,

    /// Exit after receiving this many messages
    #[arg(long, value_name = "N")]
    count: Option<u64>,
}

fn main() {
    cowling::dev_tracing::init_tracing();

    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("cowling: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> cowling::Result<()> {
    let context = Context::new();
    let socket = context.socket(args.kind.into())?;

    for endpoint in &args.bind {
        socket.bind(endpoint)?;
    }
    socket.connect_all(&args.connect)?;

    if matches!(args.kind, Kind::Sub) {
        if args.subscribe.is_empty() {
            socket.subscribe("")?;
        } else {
            socket.subscribe_all(&args.subscribe)?;
        }
    }

    // stdin is read on its own thread so the main loop can keep servicing
    // the socket while the terminal sits idle.
    let (line_tx, line_rx) = flume::unbounded::<String>();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let mut poller = Poller::new();
    poller.add(&socket, PollEvents::READABLE)?;

    let mut received = 0u64;
    let mut stdin_open = true;

    loop {
        if poller.poll(Some(Duration::from_millis(100)))? && poller.has_input(&socket) {
            let mut message = Message::new();
            while socket.receive(&mut message, true)? {
                print_message(&message);
                received += 1;
                if args.count.is_some_and(|count| received >= count) {
                    return Ok(());
                }
                message = Message::new();
            }
        }

        loop {
            match line_rx.try_recv() {
                Ok(line) => {
                    let outcome = socket.send(Message::new().push(line), true)?;
                    if let SendOutcome::WouldBlock(_) = outcome {
                        warn!("no peer ready, dropping line");
                    }
                }
                Err(flume::TryRecvError::Empty) => break,
                Err(flume::TryRecvError::Disconnected) => {
                    stdin_open = false;
                    break;
                }
            }
        }

        if !stdin_open && args.count.is_none() {
            return Ok(());
        }
    }
}

fn print_message(message: &Message) {
    let rendered: Vec<String> = message
        .iter()
        .map(|frame| match frame.as_str() {
            Some(text) => text.to_string(),
            None => format!("<{} bytes>", frame.len()),
        })
        .collect();
    println!("{}", rendered.join(" "));
}
