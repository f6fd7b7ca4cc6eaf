use std::{fs::File, io::Read};

use parsemon::IoStream;
use parsemon_json::{parse_str, parse_stream, Config, Error};

fn main() {
    if let Err(err) = main_err() {
        eprintln!("error: {err}");
    }
}

fn main_err() -> Result<(), Error> {
    let value = match std::env::args_os().nth(1) {
        Some(path) => parse_stream(IoStream::from_read_seek(File::open(path)?), Config::default())?,
        None => {
            let mut text = String::new();
            std::io::stdin().lock().read_to_string(&mut text)?;
            parse_str(&text, Config::default())?
        }
    };

    println!("{value}");
    Ok(())
}
