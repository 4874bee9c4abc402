//! Constants.

/// Substitutions in user-provided data.
pub mod subst {
    use regex::Regex;

    /// Today keyword. **Update CLAP help if you change this.**
    pub static today: &str = "<today>";
    /// Now keyword. **Update CLAP help if you change this.**
    pub static now: &str = "<now>";

    lazy_static! {
      #[doc = "Matches the `today` keyword."]
      pub static ref today_re: Regex = Regex::new(today).unwrap() ;
      #[doc = "Matches the `now` keyword."]
      pub static ref now_re: Regex = Regex::new(now).unwrap() ;
    }
}

/// Result data columns.
pub mod data {
    /// Solver configuration and tuning parameters.
    pub static objective_name: &str = "objective_name";
    /// Dataset identity and scenario.
    pub static data_name: &str = "data_name";
    /// Series identity.
    pub static solver_name: &str = "solver_name";
    /// Replicate index.
    pub static idx_rep: &str = "idx_rep";
    /// Elapsed time in seconds.
    pub static time: &str = "time";
    /// Primal objective.
    pub static objective_value: &str = "objective_value";
    /// Duality gap.
    pub static duality_gap: &str = "objective_duality_gap";
    /// Maximum relative duality gap along a path.
    pub static max_rel_duality_gap: &str = "objective_max_rel_duality_gap";

    /// Extension of CSV result files.
    pub static csv_ext: &str = "csv";
    /// Extension of parquet result files.
    pub static parquet_ext: &str = "parquet";
    /// Prefix of the index columns pandas stores in parquet files.
    pub static parquet_index: &str = "__index_level_";

    /// Label of rows whose dataset could not be extracted.
    pub static unknown: &str = "unknown";
}

/// Default visual encodings.
pub mod style {
    /// The `tab10` qualitative palette.
    pub static palette: [&str; 10] = [
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
        "#bcbd22", "#17becf",
    ];

    /// Default markers, by name.
    pub static markers: [&str; 14] = [
        "o", "s", "^", "D", "*", "x", "+", "v", "<", ">", "p", "h", "H", "d",
    ];

    /// Legend label rules: substring of the solver name, label.
    pub static legend: [(&str, &str); 5] = [
        ("acceleration=bb", "BB PGD"),
        ("acceleration=anderson", "Anderson PGD"),
        ("acceleration=fista", "FISTA"),
        ("ADMM", "ADMM"),
        ("SlopePath", "SolutionPath"),
    ];

    /// Default figure width in inches.
    pub static width: f64 = 6.;
    /// Default figure height in inches.
    pub static height: f64 = 8.5;
    /// Default font.
    pub static font: &str = "Helvetica";
    /// Default font size.
    pub static font_size: usize = 9;
    /// Default legend column count.
    pub static legend_cols: usize = 3;

    /// Outer x label.
    pub static x_label: &str = "Time (s)";
}

/// Clap-related constants.
pub mod clap {
    /// Format for booleans.
    pub static bool_format: &str = "on|off";
    /// Format for metrics.
    pub static metric_format: &str = "gap|relative|max_relative";
    /// Format for orders.
    pub static order_format: &str = "asc|desc";
}

/// Example configuration file.
pub static ex_conf_file: &str = r##"# Figure configuration for `slopeplot plot --conf <this file> ...`.
#
# Every field is optional.

[figure]
# Y quantity: `gap` (duality gap), `relative` (duality gap / objective value),
# or `max_relative` (maximum relative duality gap, path benchmarks).
metric = "relative"
# Key of the numeric parameter giving the columns, looked up as `key=value`.
param = "reg"
# Column the parameter is looked up in.
param_column = "objective_name"
# Column order: `desc` puts the largest (easiest) values on the left.
order = "desc"
# Column title prefix, `Reg: 0.5`.
column_title = "Reg"
# All cells share the y range of the whole figure.
share_y = true
# Maximum number of legend columns.
legend_cols = 3
# Only keep rows whose `data_name` matches this regex.
filter = "breheny|libsvm"
# Unmatched legend names are used as is (`raw`) or shortened to
# `base[acceleration,prox]` (`compact`).
legend_fallback = "raw"

[rows]
# Keys looked up in `data_name`. Several keys give `k1=v1, k2=v2` labels.
keys = [ "dataset" ]
# Alternatively, a regex whose first group is the label.
# pattern = "dataset=([^,\\]]+)"

# Renames, first match wins. Matchers: `exact`, `contains`, `regex`.
[[rows.rename]]
contains = "n_features=200000"
label = "High Dim, Sparse"

[[rows.rename]]
exact = "rcv1.binary"
label = "RCV1"

# Legend labels, first match wins.

[[legend]]
contains = "acceleration=bb"
label = "BB PGD"

[[legend]]
contains = "ADMM"
label = "ADMM"

# Axis limits for one facet: column value and row label.
[[limits]]
col = 0.5
row = "brca1"
x = [ -0.1, 2.9 ]
y = [ 1e-7, 15.0 ]

[style]
# Size in inches.
width = 6.0
height = 8.5
font = "Helvetica"
font_size = 9
line_width = 1.0
marker_size = 0.5
palette = [ "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd" ]
markers = [ "o", "s", "^", "D", "*" ]
"##;
