//! Command-line front end
//!
//! ```text
//! kaardiviisard -read
//! kaardiviisard -dump <filename>
//! kaardiviisard -clone <filename>
//! ```
//!
//! Connects to the first PC/SC reader, dispatches the inserted card and runs
//! one operation. All card logic lives in the library; this binary only
//! parses the mode and formats the report.

use std::env;
use std::process;

use kaardiviisard::card::fields::sanitize;
use kaardiviisard::card::Profile;
use kaardiviisard::dump::encode_line;
use kaardiviisard::session::{CardSession, Operation, Outcome, ScanRow};
use kaardiviisard::transport::PcscTransport;
use kaardiviisard::{Error, Result};

fn parse_args(args: &[String]) -> Option<Operation> {
    match args {
        [mode] if mode == "-read" => Some(Operation::Read),
        [mode, name] if mode == "-dump" => Some(Operation::Dump(name.clone())),
        [mode, name] if mode == "-clone" => Some(Operation::Clone(name.clone())),
        _ => None,
    }
}

fn usage() {
    eprintln!("Please use a correct format, Examples:");
    eprintln!();
    eprintln!("Extract contents: kaardiviisard -read");
    eprintln!("Dump card data to file: kaardiviisard -dump <filename>");
    eprintln!("Write data dump onto card: kaardiviisard -clone <filename>");
}

fn print_scan(profile: Profile, rows: &[ScanRow]) {
    for (addr, payload) in rows {
        if profile == Profile::Classic1k && addr % 4 == 0 {
            println!("------------------------Sector {}-------------------------", addr / 4);
        }
        match payload {
            Some(payload) => println!(
                "{} {:02}: {}\t |{}|",
                profile.unit_label(),
                addr,
                encode_line(payload),
                sanitize(payload)
            ),
            None => println!(
                "{} {:02}: Unable to read\t |................|",
                profile.unit_label(),
                addr
            ),
        }
    }
}

fn print_report(session: &CardSession<PcscTransport>, outcome: &Outcome) {
    let Outcome::Read {
        rows,
        uid,
        fields,
        keys_used,
    } = outcome
    else {
        return;
    };

    print_scan(session.profile(), rows);

    println!();
    println!("************ CARD INFO **************");
    println!();
    match fields {
        Ok((kind, fields)) => {
            println!("Card type: {}", kind.label());
            println!("Card ATR: {}", encode_line(session.atr()));
            if let Some(uid) = uid {
                println!("Card UID: {}", encode_line(uid));
            }
            for (name, value) in fields {
                println!("{name}: {value}");
            }
        }
        Err(e) => println!("Card type unknown: {e}"),
    }

    if !keys_used.is_empty() {
        println!();
        println!("Keys used for authentication:");
        for (sector, key) in keys_used {
            println!("sector {sector} key: {key}");
        }
    }
}

fn run(operation: &Operation) -> Result<()> {
    let transport = PcscTransport::connect()?;
    let mut session = CardSession::open(transport)?;

    let outcome = session.run(operation)?;
    match &outcome {
        Outcome::Read { .. } => print_report(&session, &outcome),
        Outcome::Dumped(path) => {
            println!("{} has been created with the dump of the card", path.display());
        }
        Outcome::Cloned(written) => {
            println!("Partial clone created ({written} units written)");
            println!("Use an ACR122U with libnfc to set the correct UID on the card for a full clone");
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(operation) = parse_args(&args) else {
        usage();
        process::exit(2);
    };

    if let Err(e) = run(&operation) {
        match e {
            Error::UnsupportedCard => eprintln!("[!] Card type not supported"),
            e => eprintln!("[!] {e}"),
        }
        process::exit(1);
    }
}
