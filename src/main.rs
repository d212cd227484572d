#[macro_use]
extern crate clap;

mod analysis;
mod cli;
mod report;
mod trace;

use std::io;

fn main() -> io::Result<()> {
    cli::main()
}
