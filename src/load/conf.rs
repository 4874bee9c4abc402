//! Figure configuration loader.

use regex::Regex;

use crate::common::{plot::*, *};
use crate::extract::{
    rules::{Matcher, Rules},
    ParamSpec, RowSpec,
};
use crate::plot::legend::{Fallback, Labeler};

use super::serde_error;

/// Loads a toml figure configuration file.
pub fn toml<P, Conf>(gconf: &Conf, file: P) -> Res<FigureConf>
where
    P: AsRef<Path>,
    Conf: GConfExt,
{
    let file = file.as_ref();

    let mut txt = String::new();
    File::open(file)?.read_to_string(&mut txt)?;

    of_str(gconf, &txt)
}

/// Loads a figure configuration from a string.
pub fn of_str<Conf: GConfExt>(gconf: &Conf, txt: &str) -> Res<FigureConf> {
    let conf = match ::toml::from_str::<LConf>(txt) {
        Ok(res) => res,
        Err(e) => bail!(serde_error(gconf, &e, txt)),
    };
    conf.finalize(gconf)
}

/// A figure configuration right after loading.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LConf {
    /// Figure options.
    figure: Option<LFigure>,
    /// Row label options.
    rows: Option<LRows>,
    /// Legend rules.
    legend: Option<Vec<LRule>>,
    /// Axis overrides.
    limits: Option<Vec<LLimits>>,
    /// Style.
    style: Option<LStyle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LFigure {
    metric: Option<String>,
    param: Option<String>,
    param_column: Option<String>,
    order: Option<String>,
    column_title: Option<String>,
    share_y: Option<bool>,
    legend_cols: Option<usize>,
    filter: Option<String>,
    legend_fallback: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LRows {
    /// Column the labels are extracted from.
    column: Option<String>,
    keys: Option<Vec<String>>,
    pattern: Option<String>,
    rename: Option<Vec<LRule>>,
}

/// A rule right after loading, exactly one matcher must be set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LRule {
    exact: Option<String>,
    contains: Option<String>,
    regex: Option<String>,
    label: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LLimits {
    col: f64,
    row: String,
    x: Vec<f64>,
    y: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LStyle {
    width: Option<f64>,
    height: Option<f64>,
    font: Option<String>,
    font_size: Option<usize>,
    line_width: Option<f64>,
    marker_size: Option<f64>,
    palette: Option<Vec<String>>,
    markers: Option<Vec<String>>,
}

impl LRule {
    /// Turns a rule into a matcher and a label.
    fn finalize<Conf: GConfExt>(self, gconf: &Conf) -> Res<(Matcher, String)> {
        let LRule {
            exact,
            contains,
            regex,
            label,
        } = self;
        let matcher = match (exact, contains, regex) {
            (Some(exact), None, None) => Matcher::Exact(exact),
            (None, Some(sub), None) => Matcher::Contains(sub),
            (None, None, Some(re)) => Matcher::Regex(
                Regex::new(&re).chain_err(|| format!("in rule for label `{}`", label))?,
            ),
            _ => bail!(
                "rule for label `{}` needs exactly one of {}, {} or {}",
                gconf.bad(&label),
                gconf.emph("exact"),
                gconf.emph("contains"),
                gconf.emph("regex")
            ),
        };
        Ok((matcher, label))
    }
}

/// Builds a rule table.
fn rules_of<Conf: GConfExt>(gconf: &Conf, rules: Vec<LRule>) -> Res<Rules> {
    let mut res = Rules::new();
    for rule in rules {
        let (matcher, label) = rule.finalize(gconf)?;
        res.push(matcher, label)
    }
    Ok(res)
}

/// A range from a two-element array.
fn range_of(axis: &str, range: &[f64]) -> Res<(f64, f64)> {
    if let [lo, hi] = range {
        Ok((*lo, *hi))
    } else {
        bail!(
            "expected `{} = [lo, hi]`, found {} value{}",
            axis,
            range.len(),
            if range.len() == 1 { "" } else { "s" }
        )
    }
}

impl LConf {
    /// Checks and finalizes an `LConf`.
    fn finalize<Conf: GConfExt>(self, gconf: &Conf) -> Res<FigureConf> {
        let mut conf = FigureConf::new()?;

        if let Some(figure) = self.figure {
            if let Some(metric) = figure.metric {
                conf.metric = Metric::of_str(&metric).ok_or_else(|| {
                    format!(
                        "unknown metric `{}`, expected `{}`",
                        gconf.bad(&metric),
                        crate::consts::clap::metric_format
                    )
                })?
            }
            if let Some(order) = figure.order {
                conf.order = Order::of_str(&order).ok_or_else(|| {
                    format!(
                        "unknown order `{}`, expected `{}`",
                        gconf.bad(&order),
                        crate::consts::clap::order_format
                    )
                })?
            }
            if figure.param.is_some() || figure.param_column.is_some() {
                let key = figure
                    .param
                    .unwrap_or_else(|| conf.extract.param.key.clone());
                let column = figure
                    .param_column
                    .unwrap_or_else(|| conf.extract.param.column.clone());
                conf.column_title = title_of_key(&key);
                conf.extract.param = ParamSpec::new(key, column)?
            }
            if let Some(title) = figure.column_title {
                conf.column_title = title
            }
            if let Some(share_y) = figure.share_y {
                conf.share_y = share_y
            }
            if let Some(cols) = figure.legend_cols {
                if cols == 0 {
                    bail!("{} must be positive", gconf.bad("legend_cols"))
                }
                conf.legend_cols = cols
            }
            if let Some(filter) = figure.filter {
                conf.extract.filter = Some(
                    Regex::new(&filter)
                        .chain_err(|| format!("while parsing filter `{}`", filter))?,
                )
            }
            if let Some(fallback) = figure.legend_fallback {
                let fallback = Fallback::of_str(&fallback).ok_or_else(|| {
                    format!(
                        "unknown legend fallback `{}`, expected `{}`",
                        gconf.bad(&fallback),
                        Fallback::values()
                    )
                })?;
                conf.legend = Labeler::new(conf.legend.rules().clone(), fallback)
            }
        }

        if let Some(rows) = self.rows {
            let spec = match (rows.keys, rows.pattern) {
                (Some(_), Some(_)) => bail!(
                    "row labels use either {} or {}, not both",
                    gconf.emph("keys"),
                    gconf.emph("pattern")
                ),
                (Some(keys), None) => RowSpec::keys(&keys)?,
                (None, Some(pattern)) => RowSpec::pattern(&pattern)?,
                (None, None) => conf.extract.rows.clone(),
            };
            let spec = if let Some(column) = rows.column {
                spec.with_column(column)
            } else {
                spec
            };
            let rename = rules_of(gconf, rows.rename.unwrap_or_default())
                .chain_err(|| "while loading row renamings")?;
            conf.extract.rows = spec.with_rename(rename)
        }

        if let Some(legend) = self.legend {
            let rules = rules_of(gconf, legend).chain_err(|| "while loading legend rules")?;
            conf.legend = Labeler::new(rules, conf.legend.fallback())
        }

        for LLimits { col, row, x: xs, y: ys } in self.limits.unwrap_or_default() {
            let key = FacetKey::new(col, row);
            let axis_limits = range_of("x", &xs)
                .and_then(|x| range_of("y", &ys).map(|y| (x, y)))
                .and_then(|(x, y)| AxisLimits::new(x, y))
                .chain_err(|| format!("in limits for facet {}", gconf.bad(key.to_string())))?;
            let prev = conf.limits.insert(key.clone(), axis_limits);
            if prev.is_some() {
                bail!("facet {} has more than one limits entry", gconf.bad(key.to_string()))
            }
        }

        if let Some(style) = self.style {
            let s = &mut conf.style;
            if let Some(width) = style.width {
                s.width = width
            }
            if let Some(height) = style.height {
                s.height = height
            }
            if let Some(font) = style.font {
                s.font = font
            }
            if let Some(font_size) = style.font_size {
                s.font_size = font_size
            }
            if let Some(line_width) = style.line_width {
                s.line_width = line_width
            }
            if let Some(marker_size) = style.marker_size {
                s.marker_size = marker_size
            }
            if let Some(palette) = style.palette {
                s.palette = palette
            }
            if let Some(markers) = style.markers {
                let mut res = Vec::with_capacity(markers.len());
                for marker in markers {
                    if let Some(m) = Marker::of_str(&marker) {
                        res.push(m)
                    } else {
                        bail!("unknown marker `{}`", gconf.bad(&marker))
                    }
                }
                s.markers = res
            }
            s.check().chain_err(|| "in style")?
        }

        Ok(conf)
    }
}
