//! Data loading.

use rayon::prelude::*;

use crate::common::{plot::FigureConf, res::*, *};

mod conf;
mod res;

/// Figure configuration loader.
pub fn conf<P, Conf>(gconf: &Conf, file: P) -> Res<FigureConf>
where
    P: AsRef<Path>,
    Conf: GConfExt,
{
    let file = file.as_ref();
    conf::toml(gconf, file).chain_err(|| {
        format!(
            "while loading figure configuration `{}`",
            gconf.emph(file.to_string_lossy())
        )
    })
}

/// Loads all the result files of a directory.
///
/// Files are parsed in parallel. A file that cannot be read or parsed is
/// skipped with a warning and contributes no rows.
pub fn results<P, Conf>(gconf: &Conf, dir: P) -> Res<ResultTable>
where
    P: AsRef<Path>,
    Conf: GConfExt,
{
    let dir = dir.as_ref();
    if !dir.is_dir() {
        bail!(
            "result directory `{}` does not exist or is not a directory",
            gconf.bad(dir.to_string_lossy())
        )
    }

    let files = res::discover(dir)
        .chain_err(|| format!("while listing `{}`", gconf.emph(dir.to_string_lossy())))?;
    log! { gconf =>
        "Found {} result file{} in `{}`",
        files.len(), if files.len() == 1 { "" } else { "s" }, gconf.emph(dir.to_string_lossy())
    }

    let loaded: Vec<_> = files
        .into_par_iter()
        .map(|path| {
            let res = res::load(&path);
            (path, res)
        })
        .collect();

    let mut table = ResultTable::new();
    for (path, res) in loaded {
        match res {
            Ok((columns, rows)) => {
                log! { gconf, verb =>
                    "  read `{}`: {} row{}",
                    path.to_string_lossy(), rows.len(), if rows.len() == 1 { "" } else { "s" }
                }
                table.push_source(path, columns, rows)
            }
            Err(e) => {
                warn! { gconf =>
                    "error reading `{}`, skipping it", gconf.bad(path.to_string_lossy()) ;
                    {
                        for line in chain_desc(&e) {
                            warn!(gconf, line => "  {}", line)
                        }
                    }
                }
                table.push_skipped(path, e)
            }
        }
    }

    if !table.skipped.is_empty() {
        log! { gconf =>
            "Skipped {} of {} file{}",
            gconf.sad(table.skipped.len().to_string()),
            table.file_count(), if table.file_count() == 1 { "" } else { "s" }
        }
    }
    log! { gconf =>
        "Combined data has {} row{} and {} column{}",
        gconf.emph(table.len().to_string()), if table.len() == 1 { "" } else { "s" },
        table.columns.len(), if table.columns.len() == 1 { "" } else { "s" }
    }

    Ok(table)
}

/// Handles a serde load error.
fn serde_error<Conf: GConfExt>(gconf: &Conf, e: &::toml::de::Error, txt: &str) -> Error {
    let mut error = format!("{}", e);

    if let Some((l, c)) = e.line_col() {
        if let Some(line) = txt.lines().nth(l) {
            let line_count = format!("{}", l + 1);
            let pad = " ".repeat(line_count.len());
            error += &format!("\n{} |", pad);
            error += &format!("\n{} | {}", line_count, line);
            error += &format!("\n{} | {}{}", pad, " ".repeat(c), gconf.bad("^"));
        }
    }

    error.into()
}
