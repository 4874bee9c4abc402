//! Plot basic types and helpers.

use std::cmp::Ordering;

use regex::Regex;

use crate::common::*;
use crate::consts::{data, style};
use crate::extract::{rules::Rules, Extractor, ParamSpec, RowSpec};
use crate::plot::legend::{Fallback, Labeler};

/// Plot configuration.
pub struct PlotConf {
    /// Result directory.
    pub results: String,
    /// Output (gnuplot script) file.
    pub file: String,
    /// Run gnuplot?
    pub run_gp: bool,
    /// Command to run on the image.
    pub then: Option<String>,
    /// Gnuplot format (terminal).
    pub fmt: PlotFmt,
    /// Figure configuration.
    pub figure: FigureConf,
    /// Global conf.
    gconf: GConf,
}
impl GConfExt for PlotConf {
    fn gconf(&self) -> &GConf {
        &self.gconf
    }
}
impl PlotConf {
    /// Creates a plot conf.
    #[inline]
    pub fn mk(
        results: String,
        file: String,
        run_gp: bool,
        then: Option<String>,
        fmt: PlotFmt,
        figure: FigureConf,
        gconf: GConf,
    ) -> Self {
        let file = file.path_subst();
        PlotConf {
            results,
            file,
            run_gp,
            then,
            fmt,
            figure,
            gconf,
        }
    }

    /// The image file gnuplot produces: the plot file with the format's
    /// extension.
    pub fn output_file(&self) -> Res<String> {
        let mut path = PathBuf::from(&self.file);
        if path.extension().and_then(|ext| ext.to_str()) == Some(self.fmt.ext()) {
            bail!(
                "plot file `{}` has the extension of the output format, \
                 it would be overwritten by gnuplot",
                self.bad(&self.file)
            )
        }
        if !path.set_extension(self.fmt.ext()) {
            bail!("illegal plot file `{}`", self.bad(&self.file))
        }
        if let Some(s) = path.to_str() {
            Ok(s.to_string())
        } else {
            bail!("illegal plot file `{}`", self.bad(&self.file))
        }
    }
}

/// Plot formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlotFmt {
    /// PDF.
    Pdf,
    /// SVG.
    Svg,
    /// PNG.
    Png,
    /// LaTeX.
    Tex,
}
impl PlotFmt {
    /// Extension of a format.
    pub fn ext(&self) -> &'static str {
        match *self {
            PlotFmt::Pdf => "pdf",
            PlotFmt::Svg => "svg",
            PlotFmt::Png => "png",
            PlotFmt::Tex => "tex",
        }
    }
    /// Gnuplot terminal of a format.
    pub fn term(&self, style: &Style) -> String {
        let font = format!("{},{}", style.font, style.font_size);
        // Pixel-based terminals use 100 pixels per inch.
        let (px_w, px_h) = (
            (style.width * 100.).round() as usize,
            (style.height * 100.).round() as usize,
        );
        match *self {
            PlotFmt::Pdf => format!(
                "set term pdfcairo enhanced font \"{}\" size {}in,{}in \
                 background rgb \"0xFFFFFF\"",
                font, style.width, style.height
            ),
            PlotFmt::Svg => format!(
                "set term svg enhanced font \"{}\" size {},{} \
                 background rgb \"0xFFFFFF\"",
                font, px_w, px_h
            ),
            PlotFmt::Png => format!(
                "set term pngcairo enhanced font \"{}\" size {},{} \
                 background rgb \"0xFFFFFF\"",
                font, px_w, px_h
            ),
            PlotFmt::Tex => format!("set term latex size {}in,{}in", style.width, style.height),
        }
    }
    /// Describes the legal values of the flag, should match the body of
    /// `Self::of_str`.
    #[inline]
    pub fn values() -> &'static str {
        "pdf|svg|png|tex"
    }
    /// Plot format of a string. Update `Self::values` if you change this.
    pub fn of_str(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(PlotFmt::Pdf),
            "svg" => Some(PlotFmt::Svg),
            "png" => Some(PlotFmt::Png),
            "tex" => Some(PlotFmt::Tex),
            _ => None,
        }
    }
    /// Plot format string validator.
    pub fn validator(s: String) -> Result<(), String> {
        if PlotFmt::of_str(&s).is_none() {
            Err(format!("expected `{}`, got `{}`", Self::values(), s))
        } else {
            Ok(())
        }
    }
}

/// Y quantity of the figure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    /// Duality gap.
    Gap,
    /// Duality gap over the objective value.
    Relative,
    /// Maximum relative duality gap along a path.
    MaxRelative,
}
impl Metric {
    /// Metric of a string. Update `consts::clap::metric_format` if you change
    /// this.
    pub fn of_str(s: &str) -> Option<Self> {
        match s {
            "gap" => Some(Metric::Gap),
            "relative" => Some(Metric::Relative),
            "max_relative" => Some(Metric::MaxRelative),
            _ => None,
        }
    }
    /// Metric string validator.
    pub fn validator(s: String) -> Result<(), String> {
        if Metric::of_str(&s).is_none() {
            Err(format!(
                "expected `{}`, got `{}`",
                crate::consts::clap::metric_format,
                s
            ))
        } else {
            Ok(())
        }
    }

    /// Axis label.
    pub fn label(&self) -> &'static str {
        match *self {
            Metric::Gap => "Duality Gap",
            Metric::Relative => "Relative Duality Gap",
            Metric::MaxRelative => "Maximum Relative Duality Gap",
        }
    }

    /// Column the metric is computed from.
    pub fn column(&self) -> &'static str {
        match *self {
            Metric::Gap | Metric::Relative => data::duality_gap,
            Metric::MaxRelative => data::max_rel_duality_gap,
        }
    }

    /// Value of the metric for a point, if it has the fields needed.
    pub fn value(&self, point: &crate::extract::Point) -> Option<f64> {
        match *self {
            Metric::Gap => point.gap,
            Metric::Relative => match (point.gap, point.objective) {
                (Some(gap), Some(obj)) => Some(gap / obj),
                _ => None,
            },
            Metric::MaxRelative => point.max_rel_gap,
        }
    }
}

/// Column order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}
impl Order {
    /// Order of a string.
    pub fn of_str(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Order::Asc),
            "desc" => Some(Order::Desc),
            _ => None,
        }
    }
    /// Order string validator.
    pub fn validator(s: String) -> Result<(), String> {
        if Order::of_str(&s).is_none() {
            Err(format!(
                "expected `{}`, got `{}`",
                crate::consts::clap::order_format,
                s
            ))
        } else {
            Ok(())
        }
    }
}

/// A column value, totally ordered.
#[derive(Clone, Copy, Debug)]
pub struct ColVal(pub f64);
impl PartialEq for ColVal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for ColVal {}
impl PartialOrd for ColVal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for ColVal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
impl ::std::fmt::Display for ColVal {
    fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

/// Identifies a facet: column value and row label.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FacetKey {
    /// Column value.
    pub col: ColVal,
    /// Row label.
    pub row: String,
}
impl FacetKey {
    /// Constructor.
    pub fn new<S: Into<String>>(col: f64, row: S) -> Self {
        FacetKey {
            col: ColVal(col),
            row: row.into(),
        }
    }
}
impl ::std::fmt::Display for FacetKey {
    fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        write!(fmt, "({}, {})", self.col, self.row)
    }
}

/// Axis limits of a facet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisLimits {
    /// X range.
    pub x: (f64, f64),
    /// Y range, on a log axis.
    pub y: (f64, f64),
}
impl AxisLimits {
    /// Constructor, fails on empty ranges and non-positive y bounds.
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Res<Self> {
        for &(axis, (lo, hi)) in &[("x", x), ("y", y)] {
            if !lo.is_finite() || !hi.is_finite() {
                bail!("{} range [{}, {}] is not finite", axis, lo, hi)
            }
            if lo >= hi {
                bail!("{} range [{}, {}] is empty", axis, lo, hi)
            }
        }
        if y.0 <= 0. {
            bail!("y range [{}, {}] has a non-positive bound on a log axis", y.0, y.1)
        }
        Ok(AxisLimits { x, y })
    }
}

/// Point markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// `o`.
    Circle,
    /// `s`.
    Square,
    /// `^`.
    TriangleUp,
    /// `D`.
    Diamond,
    /// `*`.
    Star,
    /// `x`.
    Cross,
    /// `+`.
    Plus,
    /// `v`.
    TriangleDown,
    /// `<`.
    TriangleLeft,
    /// `>`.
    TriangleRight,
    /// `p`.
    Pentagon,
    /// `h`.
    Hexagon,
    /// `H`.
    Hexagon2,
    /// `d`.
    ThinDiamond,
}
impl Marker {
    /// Marker of its one-character name.
    pub fn of_str(s: &str) -> Option<Self> {
        use self::Marker::*;
        let res = match s {
            "o" => Circle,
            "s" => Square,
            "^" => TriangleUp,
            "D" => Diamond,
            "*" => Star,
            "x" => Cross,
            "+" => Plus,
            "v" => TriangleDown,
            "<" => TriangleLeft,
            ">" => TriangleRight,
            "p" => Pentagon,
            "h" => Hexagon,
            "H" => Hexagon2,
            "d" => ThinDiamond,
            _ => return None,
        };
        Some(res)
    }

    /// Gnuplot point type.
    ///
    /// Gnuplot has no left/right triangles or hexagons, these get the
    /// remaining filled shapes.
    pub fn pt(&self) -> usize {
        use self::Marker::*;
        match *self {
            Plus => 1,
            Cross => 2,
            Star => 3,
            Square => 4,
            Circle => 6,
            TriangleUp => 8,
            TriangleLeft => 9,
            TriangleDown => 10,
            TriangleRight => 11,
            Diamond => 12,
            ThinDiamond => 13,
            Pentagon => 14,
            Hexagon => 7,
            Hexagon2 => 15,
        }
    }
}

/// Visual encoding of a series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Encoding {
    /// Color, `#rrggbb`.
    pub color: String,
    /// Marker.
    pub marker: Marker,
}

lazy_static! {
    /// Matches `#rrggbb` colors.
    static ref color_re: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

/// Style of a figure.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    /// Width in inches.
    pub width: f64,
    /// Height in inches.
    pub height: f64,
    /// Font name.
    pub font: String,
    /// Font size.
    pub font_size: usize,
    /// Line width.
    pub line_width: f64,
    /// Marker size.
    pub marker_size: f64,
    /// Colors, `#rrggbb`.
    pub palette: Vec<String>,
    /// Markers.
    pub markers: Vec<Marker>,
}
impl Default for Style {
    fn default() -> Self {
        Style {
            width: style::width,
            height: style::height,
            font: style::font.into(),
            font_size: style::font_size,
            line_width: 1.,
            marker_size: 0.5,
            palette: style::palette.iter().map(|c| c.to_string()).collect(),
            markers: style::markers
                .iter()
                .filter_map(|m| Marker::of_str(m))
                .collect(),
        }
    }
}
impl Style {
    /// Checks the style is usable.
    pub fn check(&self) -> Res<()> {
        if !(self.width > 0. && self.height > 0.) {
            bail!("illegal figure size {}x{}", self.width, self.height)
        }
        if self.palette.is_empty() {
            bail!("the palette cannot be empty")
        }
        if self.markers.is_empty() {
            bail!("the marker list cannot be empty")
        }
        for color in &self.palette {
            if !color_re.is_match(color) {
                bail!("illegal color `{}`, expected `#rrggbb`", color)
            }
        }
        Ok(())
    }

    /// Encoding of the `index`-th series, cycling through the palette and
    /// the markers.
    pub fn encoding(&self, index: usize) -> Encoding {
        Encoding {
            color: self.palette[index % self.palette.len()].clone(),
            marker: self.markers[index % self.markers.len()],
        }
    }
}

/// Default column title of a parameter key: `path_length` gives
/// `Path length`.
pub fn title_of_key(key: &str) -> String {
    let key = key.replace('_', " ");
    let mut chars = key.chars();
    if let Some(first) = chars.next() {
        first.to_uppercase().chain(chars).collect()
    } else {
        key
    }
}

/// Everything that decides what the figure looks like.
#[derive(Debug, Clone)]
pub struct FigureConf {
    /// Field extraction.
    pub extract: Extractor,
    /// Y quantity.
    pub metric: Metric,
    /// Column order.
    pub order: Order,
    /// Column title prefix.
    pub column_title: String,
    /// All cells share the global y range.
    pub share_y: bool,
    /// Maximum number of legend columns.
    pub legend_cols: usize,
    /// Legend labels.
    pub legend: Labeler,
    /// Axis overrides.
    pub limits: Map<FacetKey, AxisLimits>,
    /// Style.
    pub style: Style,
}
impl FigureConf {
    /// Default configuration: facets by `reg` and `dataset`.
    pub fn new() -> Res<Self> {
        let param = ParamSpec::new("reg", data::objective_name)?;
        let rows = RowSpec::keys(&["dataset"])?;
        Ok(FigureConf {
            extract: Extractor::new(param, rows),
            metric: Metric::Relative,
            order: Order::Desc,
            column_title: title_of_key("reg"),
            share_y: true,
            legend_cols: style::legend_cols,
            legend: Labeler::new(default_legend_rules(), Fallback::Raw),
            limits: Map::new(),
            style: Style::default(),
        })
    }

    /// Changes the numeric parameter, resetting the column title.
    pub fn set_param(&mut self, key: &str) -> Res<()> {
        let column = self.extract.param.column.clone();
        self.extract.param = ParamSpec::new(key, column)?;
        self.column_title = title_of_key(key);
        Ok(())
    }
}

/// Default legend rules.
pub fn default_legend_rules() -> Rules {
    style::legend
        .iter()
        .fold(Rules::new(), |rules, (sub, label)| rules.contains(*sub, *label))
}

/// The plot subcommand.
pub fn plot_subcommand<'a, 'b>() -> ::clap_lib::App<'a, 'b> {
    use crate::clap::utils::*;
    use crate::consts::clap::*;
    use clap_lib::*;

    SubCommand::with_name("plot")
        .about("Generates a faceted convergence plot from a result directory.")
        .arg(
            Arg::with_name("conf")
                .long("--conf")
                .help("Figure configuration file (see the `conf` subcommand)")
                .value_name("file")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("metric")
                .long("--metric")
                .help("Y quantity, overrides the configuration file")
                .takes_value(true)
                .validator(Metric::validator)
                .value_name(metric_format),
        )
        .arg(
            Arg::with_name("param")
                .long("--param")
                .help(
                    "\
Key of the numeric parameter giving the columns (`reg`, `path_length`...),
overrides the configuration file\
                    ",
                )
                .takes_value(true)
                .value_name("key"),
        )
        .arg(
            Arg::with_name("order")
                .long("--order")
                .help("Column order, overrides the configuration file")
                .takes_value(true)
                .validator(Order::validator)
                .value_name(order_format),
        )
        .arg(
            Arg::with_name("filter")
                .long("--filter")
                .help(
                    "\
Only keep results whose `data_name` matches this regex, overrides the
configuration file\
                    ",
                )
                .takes_value(true)
                .validator(regex_validator)
                .value_name("regex"),
        )
        .arg(
            Arg::with_name("then")
                .long("--then")
                .help("Specifies a command to run on the image generated (ignored if `--run_gp off`)")
                .value_name("command")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("run_gp")
                .long("--run_gp")
                .help("Runs `gnuplot` (or not) to generate the final plot")
                .default_value("on")
                .takes_value(true)
                .validator(bool_validator)
                .value_name(bool_format),
        )
        .arg(
            Arg::with_name("gp_fmt")
                .long("--to")
                .help(
                    "\
Specifies the format the plot should generate (latex format is a bit
experimental for now)\
                    ",
                )
                .default_value("pdf")
                .takes_value(true)
                .validator(PlotFmt::validator)
                .value_name(PlotFmt::values()),
        )
        .arg(
            Arg::with_name("RESULTS_DIR")
                .help("Directory containing the `.csv` or `.parquet` benchmark results")
                .value_name("results dir")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("PLOT_FILE")
                .help(
                    "\
Output plot file, `<today>` and `<now>` are replaced by the date and time
(the image is this file with the extension of the format)\
                    ",
                )
                .value_name("plot file")
                .required(true)
                .index(2),
        )
}

/// Plot configuration from the arguments of the plot subcommand.
pub fn plot_clap(gconf: GConf, matches: &::clap_lib::ArgMatches) -> Res<PlotConf> {
    use crate::clap::utils::bool_of_str;

    let mut figure = if let Some(file) = matches.value_of("conf") {
        crate::load::conf(&gconf, file)?
    } else {
        FigureConf::new()?
    };

    if let Some(metric) = matches.value_of("metric") {
        figure.metric = Metric::of_str(metric)
            .ok_or_else(|| clap_err("metric", format!("unexpected value `{}`", metric)))?
    }
    if let Some(order) = matches.value_of("order") {
        figure.order = Order::of_str(order)
            .ok_or_else(|| clap_err("order", format!("unexpected value `{}`", order)))?
    }
    if let Some(key) = matches.value_of("param") {
        figure.set_param(key)?
    }
    if let Some(filter) = matches.value_of("filter") {
        figure.extract.filter = Some(
            Regex::new(filter).chain_err(|| format!("while parsing filter `{}`", filter))?,
        )
    }

    let run_gp = matches
        .value_of("run_gp")
        .and_then(bool_of_str)
        .ok_or_else(|| clap_err("run_gp", "expected `on` or `off`"))?;
    let then = matches.value_of("then").map(|s| s.to_string());
    let fmt = matches
        .value_of("gp_fmt")
        .and_then(PlotFmt::of_str)
        .ok_or_else(|| clap_err("gp_fmt", format!("expected `{}`", PlotFmt::values())))?;
    let results = matches
        .value_of("RESULTS_DIR")
        .ok_or_else(|| clap_err("RESULTS_DIR", "argument is mandatory"))?
        .to_string();
    let file = matches
        .value_of("PLOT_FILE")
        .ok_or_else(|| clap_err("PLOT_FILE", "argument is mandatory"))?
        .to_string();

    Ok(PlotConf::mk(results, file, run_gp, then, fmt, figure, gconf))
}
