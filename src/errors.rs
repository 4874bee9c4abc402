//! Slopeplot's errors and error handling.

use std::io::Write;

use crate::common::ColorExt;

error_chain! {
  types {
    Error, ErrorKind, ResExt, Res ;
  }

  foreign_links {
    Io(::std::io::Error)
    #[doc = "IO error."] ;
    Csv(::csv::Error)
    #[doc = "CSV error."] ;
    Regex(::regex::Error)
    #[doc = "Regex error."] ;
    Toml(::toml::de::Error)
    #[doc = "TOML error."] ;
    Glob(::glob::PatternError)
    #[doc = "Glob pattern error."] ;
    Parquet(::parquet::errors::ParquetError)
    #[doc = "Parquet error."] ;
  }

  errors {
    #[doc = "Clap: argument name, error description."]
    Clap(arg: String, blah: String) {
      description("clap error")
      display(
        "clap error on {}{}", arg, if blah.is_empty() {
          "".to_string()
        } else {
          format!(": {}", blah)
        }
      )
    }
    #[doc = "A numeric field matched its pattern but is not a number: \
      column, key, text."]
    BadNumber(column: String, key: String, text: String) {
      description("illegal numeric field")
      display(
        "value `{}` for `{}` in column `{}` is not a number", text, key, column
      )
    }
    #[doc = "Render failure: output file, description."]
    Render(file: String, blah: String) {
      description("render error")
      display("failed to render `{}`: {}", file, blah)
    }
  }
}

/// Clap error.
pub fn clap_err<S1: Into<String>, S2: Into<String>>(arg: S1, blah: S2) -> Error {
    Error::from_kind(ErrorKind::Clap(arg.into(), blah.into()))
}

/// Render error.
pub fn render_err<S1: Into<String>, S2: Into<String>>(file: S1, blah: S2) -> Error {
    Error::from_kind(ErrorKind::Render(file.into(), blah.into()))
}

/// Writes an error chain.
fn write_err<C: ColorExt, W: Write>(conf: &C, err: &Error, w: &mut W) -> ::std::io::Result<()> {
    let (head, indent) = (conf.bad("|===| "), conf.bad("| "));
    writeln!(w, "{}{}:", head, conf.bad("Error"))?;
    for err in err.iter() {
        for line in format!("{}", err).lines() {
            writeln!(w, "{}{}", indent, line)?
        }
    }
    writeln!(w, "{}", head)?;
    Ok(())
}

/// Prints an error.
pub fn print_one_err<C: ColorExt>(conf: &C, err: &Error) {
    let stderr = &mut ::std::io::stderr();

    if let Err(io_e) = write_err(conf, &err, stderr) {
        println!(
            "An error occured, but writing to stderr {}:",
            conf.bad("failed")
        );
        println!("> {}", io_e);
        println!();

        let stdout = &mut ::std::io::stdout();
        if let Err(io_e) = write_err(conf, &err, stdout) {
            println!("Writing to stdout {}:", conf.bad("also failed"));
            println!("> {}", io_e);
            println!();

            println!("{} Original error:", conf.bad("|===|"));
            println!("{} {}", conf.bad("|"), err);
            println!("{}", conf.bad("|===|"))
        }
    }
}

/// Prints an error and exits if `exit` is true.
pub fn print_err<C: ColorExt>(conf: &C, err: &Error, exit: bool) {
    print_one_err(conf, &err);
    if exit {
        ::std::process::exit(2)
    }
}

/// Multi-line description of an error chain, used when a recovered error is
/// reported as a warning.
pub fn chain_desc(err: &Error) -> Vec<String> {
    err.iter().map(|e| format!("{}", e)).collect()
}
