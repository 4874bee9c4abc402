//! `slopeplot` plots SLOPE solver benchmark results.

extern crate slopeplot;

use slopeplot::{clap::Clap, common::*};

/// Entry point.
fn main() {
    match slopeplot::clap::work() {
        Ok(Clap::Plot(conf)) => match slopeplot::plot::work(&conf) {
            Ok(_) => ::std::process::exit(0),
            Err(e) => print_err(&conf, &e, true),
        },
        Ok(Clap::Conf(conf, file)) => {
            if let Err(e) = example_conf_file(&conf, &file) {
                print_err(&conf, &e, true)
            }
        }
        Err(e) => print_err(&GConf::default(), &e, true),
    }
}
