//! Common types and functions used by `slopeplot`.

pub use std::fs::File;
pub use std::io::{BufRead, BufReader, Read, Write};
pub use std::iter::{FromIterator, Iterator};
pub use std::path::{Path, PathBuf};
pub use std::process::Command;
pub use std::str::FromStr;

pub use std::collections::BTreeMap as Map;
pub use std::collections::BTreeSet as Set;

use crate::ansi::{Colour, Style};

pub use crate::errors::*;

/// Log macro.
#[macro_export]
macro_rules! log {

    ( | internal | $pref:expr => ) => (()) ;

    ( | internal | $pref:expr => ; $($tail:tt)* ) => (
        log!(| internal | $pref => $($tail)*)
    ) ;

    ( | internal | $pref:expr => let $p:pat = $e:expr ; $($tail:tt)* ) => ({
        let $p = $e ;
        log!(| internal | $pref => $($tail)*)
    }) ;

    ( | internal | $pref:expr => { $($head:tt)+ } $($tail:tt)* ) => ({
        { $($head)+ }
        log!(| internal | $pref => $($tail)*)
    }) ;

    ( | internal | $pref:expr => $($head:expr),* ; $($tail:tt)* ) => ({
        print!("{}", $pref) ;
        println!($($head),*) ;
        log!(| internal | $pref => $($tail)*)
    }) ;

    ( $conf:expr , verb => $($stuff:tt)+ ) => ({
        if $conf.verbose() {
            log!( |internal| "" => $($stuff)+ ; )
        }
    }) ;

    ( $conf:expr => $($stuff:tt)+ ) => ({
        if ! $conf.quiet() {
            log!( |internal| "" => $($stuff)+ ; )
        }
    }) ;
}

/// Warning macro.
#[macro_export]
macro_rules! warn {
    ($conf:expr, line => $($stuff:tt)+) => (
        log!{ |internal| $conf.sad("| ") => $($stuff)+ ; }
    ) ;

    ($conf:expr => $($stuff:tt)+) => (
        if ! $conf.quiet() {
            println!("") ;
            println!("{}:", $conf.sad("|===| Warning")) ;
            warn!{ $conf, line => $($stuff)+ ; }
            println!("{}", $conf.sad("|===|")) ;
            println!("")
        }
    ) ;
}

pub mod plot;
pub mod res;

/// Creates a directory if not already there.
#[inline]
pub fn mk_dir<P: AsRef<Path>>(path: P) -> Res<()> {
    ::std::fs::DirBuilder::new()
        .recursive(true)
        .create(path)
        .map_err(|e| e.into())
}

/// Checks that a file exists.
#[inline]
pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    path.exists() && path.is_file()
}

/// Path of a hidden temporary sibling of a file, used for write-then-rename.
pub fn tmp_sibling<P: AsRef<Path>>(path: P) -> PathBuf {
    use chrono::Utc;
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tmpfile".into());
    let now = Utc::now();
    path.with_file_name(format!(
        ".{}.{}.{}{:0>9}.tmp",
        name,
        ::std::process::id(),
        now.timestamp(),
        now.timestamp_subsec_nanos()
    ))
}

/// Can color things.
pub trait ColorExt {
    /// The styles in the colorizer: emph, happy, sad, and bad.
    fn styles(&self) -> &Styles;
    /// String emphasis.
    #[inline]
    fn emph<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles().emph.paint(s.as_ref()))
    }
    /// Happy string.
    #[inline]
    fn happy<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles().hap.paint(s.as_ref()))
    }
    /// Sad string.
    #[inline]
    fn sad<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles().sad.paint(s.as_ref()))
    }
    /// Bad string.
    #[inline]
    fn bad<S: AsRef<str>>(&self, s: S) -> String {
        format!("{}", self.styles().bad.paint(s.as_ref()))
    }
}

/// Contains some styles for coloring.
#[derive(Debug, Clone)]
pub struct Styles {
    /// Emphasis style.
    emph: Style,
    /// Happy style.
    hap: Style,
    /// Sad style.
    sad: Style,
    /// Bad style.
    bad: Style,
}
impl Default for Styles {
    fn default() -> Self {
        Styles::new(true)
    }
}
impl ColorExt for Styles {
    fn styles(&self) -> &Styles {
        self
    }
}
impl Styles {
    /// Creates some styles.
    pub fn new(colored: bool) -> Self {
        let style = |colour: Colour| {
            if colored {
                colour.normal().bold()
            } else {
                Style::new()
            }
        };
        Styles {
            emph: if colored {
                Style::new().bold()
            } else {
                Style::new()
            },
            hap: style(Colour::Green),
            sad: style(Colour::Yellow),
            bad: style(Colour::Red),
        }
    }
}

/// Has a verbosity setting.
pub trait VerbExt {
    /// Access to the verbosity.
    fn verb(&self) -> &Verb;
    /// True if quiet.
    #[inline]
    fn quiet(&self) -> bool {
        *self.verb() == Verb::Quiet
    }
    /// True if normal.
    #[inline]
    fn normal(&self) -> bool {
        *self.verb() == Verb::Normal
    }
    /// True if verbose.
    #[inline]
    fn verbose(&self) -> bool {
        *self.verb() == Verb::Verbose
    }
}

/// Verbosity.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum Verb {
    /// No output.
    Quiet,
    /// Normal output.
    Normal,
    /// Verbose output.
    Verbose,
}
impl Default for Verb {
    fn default() -> Self {
        Verb::Normal
    }
}
impl VerbExt for Verb {
    fn verb(&self) -> &Verb {
        self
    }
}

/// Global configuration.
#[derive(Debug, Default, Clone)]
pub struct GConf {
    /// Verbosity.
    verb: Verb,
    /// Colored flag (for comparison).
    colored: bool,
    /// Styles.
    styles: Styles,
    /// Overwrite files when present.
    pub ow_files: bool,
}
impl PartialEq for GConf {
    fn eq(&self, other: &Self) -> bool {
        self.verb == other.verb && self.colored == other.colored && self.ow_files == other.ow_files
    }
}
impl GConfExt for GConf {
    fn gconf(&self) -> &GConf {
        self
    }
}
impl GConf {
    /// Creates a configuration.
    #[inline]
    pub fn new(verb: Verb, colored: bool, ow_files: bool) -> Self {
        GConf {
            verb,
            colored,
            styles: Styles::new(colored),
            ow_files,
        }
    }
}

/// Has a global conf.
pub trait GConfExt: ColorExt {
    /// The global conf.
    fn gconf(&self) -> &GConf;

    /// Fails if `path` exists and the global conf does not allow overwriting.
    fn check_overwrite<P: AsRef<Path>>(&self, path: P) -> Res<()> {
        let path = path.as_ref();
        if !self.gconf().ow_files && path.exists() {
            bail!(
                "file `{}` exists, not overwriting without {}",
                self.sad(path.to_string_lossy()),
                self.emph("-f")
            )
        }
        Ok(())
    }

    /// Writes a file by writing a temporary sibling and renaming it.
    ///
    /// Creates the parent directory if necessary. The final file is either
    /// absent, its previous version, or complete.
    fn write_atomic<P, F>(&self, path: P, write: F) -> Res<()>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut File) -> Res<()>,
    {
        let path = path.as_ref();
        self.check_overwrite(path)?;
        if let Some(parent) = path.parent() {
            if parent != Path::new("") {
                mk_dir(parent).chain_err(|| "while creating parent directory")?
            }
        }
        let tmp = tmp_sibling(path);
        let res = ::std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp)
            .map_err(Error::from)
            .and_then(|mut file| {
                write(&mut file)?;
                file.sync_all()?;
                Ok(())
            })
            .and_then(|()| ::std::fs::rename(&tmp, path).map_err(|e| e.into()));
        if res.is_err() {
            let _ = ::std::fs::remove_file(&tmp);
        }
        res.chain_err(|| format!("while writing `{}`", self.emph(path.to_string_lossy())))
    }
}
impl<T: GConfExt> ColorExt for T {
    fn styles(&self) -> &Styles {
        &self.gconf().styles
    }
}
impl<T: GConfExt> VerbExt for T {
    fn verb(&self) -> &Verb {
        &self.gconf().verb
    }
}

/// Extends string types with a substitution function.
pub trait StrExt {
    /// Replaces all non-ovelapping matches of a regex with something.
    fn subst(&self, regex: &::regex::Regex, something: &str) -> String;
    /// Performs path substitutions: `today` and `now`.
    fn path_subst(&self) -> String {
        use crate::consts::subst::{now_re, today_re};
        use chrono::{Datelike, Local, Timelike};
        let now = Local::now();
        let today = &format!("{}_{:0>2}_{:0>2}", now.year(), now.month(), now.day());
        let time = &format!("{:0>2}_{:0>2}", now.hour(), now.minute());
        let res = self.subst(&*today_re, today);
        res.subst(&*now_re, time)
    }
}
impl StrExt for str {
    fn subst(&self, regex: &::regex::Regex, something: &str) -> String {
        format!("{}", regex.replace_all(self, something))
    }
}
impl StrExt for String {
    fn subst(&self, regex: &::regex::Regex, something: &str) -> String {
        (self as &str).subst(regex, something)
    }
}

/// Dumps the example configuration file somewhere.
pub fn example_conf_file(conf: &GConf, file: &str) -> Res<()> {
    log! { conf => "Writing example configuration to `{}`...", conf.emph(& file) }
    conf.write_atomic(file, |writer| {
        writer
            .write_all(crate::consts::ex_conf_file.as_bytes())
            .map_err(|e| e.into())
    })?;
    log! {
      conf =>
        "Done" ;
        "" ;
        "Generate a faceted convergence plot with" ;
        "> {} {} --conf {} results/ images/<today>_bench.plot",
        conf.happy("slopeplot"), conf.emph("plot"), file ;
        "  where <today> is today's date `YYYY_MM_DD`." ;
        "If you have gnuplot, slopeplot will generate `images/<today>_bench.pdf` \
        automatically." ;
        "" ;
        "Make sure to read `{}`.", conf.emph("slopeplot help plot")
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn subst_replaces_keywords() {
        let res = "out/<today>/fig_<now>.plot".path_subst();
        assert!(!res.contains("<today>"));
        assert!(!res.contains("<now>"));
        assert!(res.starts_with("out/"));
        assert!(res.ends_with(".plot"))
    }

    #[test]
    fn atomic_write_respects_overwrite_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("file.txt");

        let conf = GConf::new(Verb::Quiet, false, false);
        conf.write_atomic(&path, |w| w.write_all(b"one").map_err(|e| e.into()))
            .unwrap();
        assert_eq!(::std::fs::read_to_string(&path).unwrap(), "one");

        assert!(conf
            .write_atomic(&path, |w| w.write_all(b"two").map_err(|e| e.into()))
            .is_err());
        assert_eq!(::std::fs::read_to_string(&path).unwrap(), "one");

        let conf = GConf::new(Verb::Quiet, false, true);
        conf.write_atomic(&path, |w| w.write_all(b"two").map_err(|e| e.into()))
            .unwrap();
        assert_eq!(::std::fs::read_to_string(&path).unwrap(), "two");

        // No temporary leftovers.
        let count = ::std::fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(count, 1)
    }

    #[test]
    fn failed_write_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        let conf = GConf::new(Verb::Quiet, false, false);
        let res = conf.write_atomic(&path, |_| bail!("nope"));
        assert!(res.is_err());
        assert_eq!(::std::fs::read_dir(dir.path()).unwrap().count(), 0)
    }
}
