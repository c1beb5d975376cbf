extern crate env_logger;
#[macro_use]
extern crate log;
extern crate snapshotsweep;

use snapshotsweep::harness;
use snapshotsweep::settings;
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // parse command line arguments
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => {
            println!("Please pass a parameter file.");
            std::process::exit(1)
        }
        2 => {
            let settings = match settings::read_parameter_file(&args[1]) {
                Ok(s) => s,
                Err(e) => {
                    println!("Error reading parameter file: {}", e);
                    std::process::exit(1)
                }
            };

            info!("snapshotsweep v{}", snapshotsweep::VERSION);

            match harness::run(&settings) {
                Ok(outputs) => info!("wrote {} composite(s)", outputs.len()),
                Err(e) => {
                    println!("Error during snapshot sweep: {}", e);
                    for cause in e.iter().skip(1) {
                        println!("caused by: {}", cause);
                    }
                    std::process::exit(1)
                }
            }
        }
        _ => {
            println!("You've passed too many arguments. Please don't do that.");
            std::process::exit(1)
        }
    }

    std::process::exit(0);
}
