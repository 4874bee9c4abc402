//! Plot generation.

pub mod compare;
pub mod gnuplot;
pub mod grid;
pub mod legend;

use crate::common::{plot::*, *};
use crate::consts::data;

/// Loads the results, builds the figure and writes it.
///
/// Returns the image file if one was generated.
pub fn work(conf: &PlotConf) -> Res<Option<String>> {
    let table = crate::load::results(conf, &conf.results)?;
    if table.is_empty() {
        warn! { conf =>
            "no data to plot, nothing to do" ;
            "found {} result file{} in `{}`, {} could be read",
            table.file_count(), if table.file_count() == 1 { "" } else { "s" },
            conf.emph(&conf.results), table.sources.len()
        }
        return Ok(None);
    }

    let figure = &conf.figure;
    let metric_column = figure.metric.column();
    if !table.has_column(metric_column) {
        warn! { conf =>
            "no result file has a `{}` column", conf.sad(metric_column) ;
            "cannot compute the {}", figure.metric.label().to_lowercase()
        }
    }
    if figure.metric == Metric::Relative && !table.has_column(data::objective_value) {
        warn! { conf =>
            "no result file has a `{}` column", conf.sad(data::objective_value) ;
            "cannot compute the relative duality gap"
        }
    }

    log! { conf => "Extracting `{}` values and row labels...", figure.extract.param.key }
    let extracted = figure.extract.run(&table)?;
    if extracted.filtered > 0 {
        log! { conf => "  {} row{} filtered out", extracted.filtered, plural(extracted.filtered) }
    }
    if extracted.no_param > 0 {
        log! { conf =>
            "  {} row{} without `{}` in `{}`, ignored",
            conf.sad(extracted.no_param.to_string()), plural(extracted.no_param),
            figure.extract.param.key, figure.extract.param.column
        }
    }
    if extracted.incomplete > 0 {
        log! { conf =>
            "  {} row{} without a solver name or a time, ignored",
            conf.sad(extracted.incomplete.to_string()), plural(extracted.incomplete)
        }
    }
    if extracted.unknown > 0 {
        log! { conf =>
            "  {} row{} with an `{}` row label",
            conf.sad(extracted.unknown.to_string()), plural(extracted.unknown), data::unknown
        }
    }

    if extracted.points.is_empty() {
        warn! { conf =>
            "no data to plot, nothing to do" ;
            "all {} row{} were excluded", table.len(), plural(table.len())
        }
        return Ok(None);
    }

    let fig = compare::build(figure, &extracted.points);
    log! { conf =>
        "  {} row{}, {} column{}, {} series",
        fig.plan.rows.len(), plural(fig.plan.rows.len()),
        fig.plan.cols.len(), plural(fig.plan.cols.len()),
        fig.plan.encodings.len()
    }
    if fig.dropped > 0 {
        log! { conf =>
            "  {} point{} with no positive finite {}, not drawn",
            conf.sad(fig.dropped.to_string()), plural(fig.dropped),
            figure.metric.label().to_lowercase()
        }
    }
    report_unused(conf, &fig);

    let output = conf.output_file()?;
    if conf.run_gp {
        conf.check_overwrite(&output)?
    }

    log! { conf, verb => "  writing plot file `{}`...", conf.emph(&conf.file) }
    conf.write_atomic(&conf.file, |file| {
        gnuplot::write_script(file, &fig, figure, conf.fmt, &output)
    })?;

    if !conf.run_gp {
        log! { conf => "Plot file written to `{}`", conf.emph(&conf.file) }
        return Ok(None);
    }

    log! { conf, verb => "  running gnuplot..." }
    gnuplot::run(conf, &conf.file, &output)?;
    log! { conf => "Plot written to `{}`", conf.happy(&output) }

    if let Some(cmd) = &conf.then {
        gnuplot::then(conf, cmd, &output)?
    }

    Ok(Some(output))
}

/// Plural suffix.
fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Reports configuration entries that match nothing, verbose only.
fn report_unused(conf: &PlotConf, fig: &compare::Figure) {
    if !conf.verbose() {
        return;
    }
    let figure = &conf.figure;
    for key in &fig.unused_limits {
        log! { conf, verb => "  limits for facet {} match no facet", conf.sad(key.to_string()) }
    }
    for rule in figure.legend.rules().unused(fig.plan.encodings.keys().map(|s| s.as_str())) {
        log! { conf, verb =>
            "  legend rule {} ({}) matches no series", conf.sad(&rule.label), rule.matcher
        }
    }
    for rule in figure
        .extract
        .rows
        .rename
        .unused(fig.plan.rows.iter().map(|s| s.as_str()))
    {
        // Renaming happens before planning, rules are checked against their output.
        if !fig.plan.rows.iter().any(|row| row == &rule.label) {
            log! { conf, verb =>
                "  row rename {} ({}) matches no row", conf.sad(&rule.label), rule.matcher
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn plot_conf(results: &Path, file: &Path, run_gp: bool) -> PlotConf {
        PlotConf::mk(
            results.to_string_lossy().into_owned(),
            file.to_string_lossy().into_owned(),
            run_gp,
            None,
            PlotFmt::Pdf,
            FigureConf::new().unwrap(),
            GConf::new(Verb::Quiet, false, false),
        )
    }

    const header: &str =
        "objective_name,data_name,solver_name,idx_rep,time,objective_value,objective_duality_gap\n";

    #[test]
    fn end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results");
        ::std::fs::create_dir(&results).unwrap();
        ::std::fs::write(
            results.join("admm.csv"),
            format!(
                "{}\"SLOPE[fit_intercept=True,q=0.1,reg=0.1]\",breheny[dataset=brca1],ADMM,0,0.5,2.0,0.1\n",
                header
            ),
        )
        .unwrap();
        ::std::fs::write(
            results.join("pgd.csv"),
            format!(
                "{}\"SLOPE[fit_intercept=True,q=0.1,reg=0.1]\",breheny[dataset=brca1],\"PGD[acceleration=bb]\",0,0.7,2.0,0.01\n",
                header
            ),
        )
        .unwrap();

        let conf = plot_conf(&results, &dir.path().join("out").join("fig.plot"), false);
        let table = crate::load::results(&conf, &conf.results).unwrap();
        assert_eq!(table.len(), 2);
        let extracted = conf.figure.extract.run(&table).unwrap();
        let fig = compare::build(&conf.figure, &extracted.points);

        assert_eq!(fig.cells.rows(), 1);
        assert_eq!(fig.cells.cols(), 1);
        let cell = &fig.cells[(0, 0)];
        assert_eq!(cell.key, FacetKey::new(0.1, "brca1"));
        assert_eq!(cell.series.len(), 2);
        assert!(cell.series.iter().all(|series| series.points.len() == 1));
        let labels: Vec<_> = fig.legend.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["ADMM", "BB PGD"]);

        // Script only, no gnuplot.
        assert_eq!(work(&conf).unwrap(), None);
        let script = ::std::fs::read_to_string(&conf.file).unwrap();
        assert!(script.contains("title 'BB PGD'"));
        // Not overwritten without `-f`.
        assert!(work(&conf).is_err())
    }

    #[test]
    fn empty_results_do_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fig.plot");
        let conf = plot_conf(dir.path(), &file, true);
        assert_eq!(work(&conf).unwrap(), None);
        assert!(!file.exists())
    }

    #[test]
    fn bad_numbers_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        ::std::fs::write(
            dir.path().join("res.csv"),
            format!(
                "{}\"SLOPE[reg=lots]\",breheny[dataset=brca1],ADMM,0,0.5,2.0,0.1\n",
                header
            ),
        )
        .unwrap();
        let file = dir.path().join("fig.plot");
        let conf = plot_conf(dir.path(), &file, false);
        assert!(work(&conf).is_err());
        assert!(!file.exists())
    }
}
