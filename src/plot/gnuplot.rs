//! Gnuplot backend.
//!
//! A figure becomes a self-contained gnuplot script: the data lives in
//! datablocks, the cells are laid out by hand in a multiplot and the legend
//! is a last, invisible plot placed above the grid.

use crate::common::{plot::*, *};

use super::compare::{Cell, Figure};

/// Gnuplot string literal, single-quoted so that no escape is interpreted.
pub fn quoted(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Text as the terminal will typeset it, LaTeX-escaped for `tex`.
pub fn text(fmt: PlotFmt, s: &str) -> String {
    if fmt != PlotFmt::Tex {
        return s.into();
    }
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => res.push_str("\\textbackslash{}"),
            '~' => res.push_str("\\textasciitilde{}"),
            '^' => res.push_str("\\textasciicircum{}"),
            '_' | '%' | '&' | '#' | '$' | '{' | '}' => {
                res.push('\\');
                res.push(c)
            }
            _ => res.push(c),
        }
    }
    res
}

/// Quoted terminal text.
fn label(fmt: PlotFmt, s: &str) -> String {
    quoted(&text(fmt, s))
}

/// Format of the y tic labels.
fn y_format(fmt: PlotFmt) -> &'static str {
    match fmt {
        PlotFmt::Tex => "$10^{%L}$",
        _ => "10^{%L}",
    }
}

/// True if a cell shares the y range of the first cell of its row, in which
/// case its y tic labels are hidden.
fn hides_y_tics(fig: &Figure, (row, col): (usize, usize), cell: &Cell) -> bool {
    col > 0 && cell.y_range.is_some() && cell.y_range == fig.cells[(row, 0)].y_range
}

/// Smallest cell side, as a fraction of the figure.
static min_cell_side: f64 = 0.02;

/// Positions of the cells, in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    rows: usize,
    cols: usize,
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
    hgap: f64,
    vgap: f64,
}
impl Layout {
    /// Layout of a figure.
    ///
    /// Fails if the cells do not fit in the figure once the legend and the
    /// titles are placed.
    pub fn new(fig: &Figure, style: &Style) -> Res<Self> {
        // Height of a line of text, as a fraction of the figure.
        let line = (style.font_size as f64) * 1.6 / (style.height * 72.);
        let legend = (fig.legend.lines() as f64 + 0.5) * line;
        let title = 1.5 * line;
        // Cells right of the first column need room for their y tics.
        let inner_tics = fig
            .cells
            .iter()
            .any(|(coords, cell)| coords.1 > 0 && !hides_y_tics(fig, coords, cell));
        let layout = Layout {
            rows: fig.cells.rows(),
            cols: fig.cells.cols(),
            left: 0.11,
            right: 0.93,
            bottom: 0.07,
            top: 1. - legend - title,
            hgap: if inner_tics { 0.07 } else { 0.015 },
            vgap: 0.04,
        };

        let (l, r, b, t) = layout.cell(0, 0);
        if t - b < min_cell_side {
            bail!(
                "{} row{} and {} legend line{} do not fit in a {}in high figure, \
                 increase `style.height` or `figure.legend_cols`",
                layout.rows,
                if layout.rows == 1 { "" } else { "s" },
                fig.legend.lines(),
                if fig.legend.lines() == 1 { "" } else { "s" },
                style.height
            )
        }
        if r - l < min_cell_side {
            bail!(
                "{} columns do not fit in a {}in wide figure, increase `style.width`",
                layout.cols,
                style.width
            )
        }
        Ok(layout)
    }

    /// Left, right, bottom and top of a cell.
    pub fn cell(&self, row: usize, col: usize) -> (f64, f64, f64, f64) {
        let (rows, cols) = (self.rows.max(1) as f64, self.cols.max(1) as f64);
        let width = (self.right - self.left - self.hgap * (cols - 1.)) / cols;
        let height = (self.top - self.bottom - self.vgap * (rows - 1.)) / rows;
        let left = self.left + (col as f64) * (width + self.hgap);
        let top = self.top - (row as f64) * (height + self.vgap);
        (left, left + width, top - height, top)
    }

    /// Vertical middle of the grid.
    pub fn middle(&self) -> f64 {
        (self.bottom + self.top) / 2.
    }
}

static plot_prefix: &str = r#"
set border 3 linecolor rgbcolor "0x000000"
set xtics nomirror
set ytics nomirror
set mxtics
set logscale y
unset key
"#;

/// Name of the datablock of a series.
fn block_name(row: usize, col: usize, series: usize) -> String {
    format!("$d_{}_{}_{}", row, col, series)
}

/// Index of the style line of a series.
fn style_index(fig: &Figure, solver: &str) -> Res<usize> {
    fig.plan
        .encodings
        .keys()
        .position(|s| s == solver)
        .map(|index| index + 1)
        .ok_or_else(|| format!("[bug] no style for series `{}`", solver).into())
}

/// Writes the datablocks of a cell.
fn write_blocks<W: Write>(w: &mut W, (row, col): (usize, usize), cell: &Cell) -> Res<()> {
    for (index, series) in cell.series.iter().enumerate() {
        writeln!(w, "# {} / {}", cell.key, series.solver.replace('\n', " "))?;
        writeln!(w, "{} << EOD", block_name(row, col, index))?;
        for (index, &(time, y)) in series.points.iter().enumerate() {
            if series.breaks.contains(&index) {
                writeln!(w)?
            }
            writeln!(w, "{} {:e}", time, y)?
        }
        writeln!(w, "EOD")?
    }
    Ok(())
}

/// Writes the plot command of a cell.
fn write_cell<W: Write>(
    w: &mut W,
    layout: &Layout,
    fig: &Figure,
    fmt: PlotFmt,
    (row, col): (usize, usize),
    cell: &Cell,
) -> Res<()> {
    let (l, r, b, t) = layout.cell(row, col);
    writeln!(w)?;
    writeln!(w, "# Cell {}", cell.key)?;
    writeln!(w, "set lmargin at screen {:.4}", l)?;
    writeln!(w, "set rmargin at screen {:.4}", r)?;
    writeln!(w, "set bmargin at screen {:.4}", b)?;
    writeln!(w, "set tmargin at screen {:.4}", t)?;

    if let Some(title) = &cell.title {
        writeln!(w, "set title {} noenhanced", label(fmt, title))?
    } else {
        writeln!(w, "unset title")?
    }
    if let Some(side) = &cell.side {
        writeln!(
            w,
            "set label 1 {} at graph 1.04, 0.5 center rotate by -90 noenhanced",
            label(fmt, side)
        )?
    } else {
        writeln!(w, "unset label 1")?
    }

    match cell.x_range {
        Some((lo, hi)) => writeln!(w, "set xrange [{}:{}]", lo, hi)?,
        None if cell.is_empty() => writeln!(w, "set xrange [0:1]")?,
        None => writeln!(w, "set autoscale x")?,
    }
    match cell.y_range {
        Some((lo, hi)) => writeln!(w, "set yrange [{:e}:{:e}]", lo, hi)?,
        None if cell.is_empty() => writeln!(w, "set yrange [1e-7:1]")?,
        None => writeln!(w, "set autoscale y")?,
    }
    if hides_y_tics(fig, (row, col), cell) {
        writeln!(w, "set format y \"\"")?
    } else {
        writeln!(w, "set format y \"{}\"", y_format(fmt))?
    }

    if cell.is_empty() {
        writeln!(w, "plot NaN notitle")?
    } else {
        write!(w, "plot")?;
        for (index, series) in cell.series.iter().enumerate() {
            let style = style_index(fig, &series.solver)?;
            write!(
                w,
                "{} \\\n  {} using 1:2 with linespoints ls {} notitle",
                if index == 0 { "" } else { "," },
                block_name(row, col, index),
                style
            )?
        }
        writeln!(w)?
    }
    Ok(())
}

/// Writes the legend and the outer labels, as a last invisible plot.
fn write_legend<W: Write>(w: &mut W, layout: &Layout, fig: &Figure, fmt: PlotFmt) -> Res<()> {
    writeln!(w)?;
    writeln!(w, "# Legend and outer labels")?;
    writeln!(w, "unset title")?;
    writeln!(w, "unset label 1")?;
    writeln!(
        w,
        "set label 2 {} at screen {:.4}, 0.015 center noenhanced",
        label(fmt, &fig.x_label),
        (layout.left + layout.right) / 2.
    )?;
    writeln!(
        w,
        "set label 3 {} at screen 0.02, {:.4} center rotate by 90 noenhanced",
        label(fmt, &fig.y_label),
        layout.middle()
    )?;
    writeln!(w, "unset border")?;
    writeln!(w, "unset tics")?;
    writeln!(w, "set xrange [0:1]")?;
    writeln!(w, "set yrange [1:10]")?;
    writeln!(
        w,
        "set key at screen 0.5, 0.995 center top horizontal maxcols {} samplen 2",
        fig.legend.cols
    )?;

    if fig.legend.is_empty() {
        writeln!(w, "plot NaN notitle")?
    } else {
        write!(w, "plot")?;
        for (index, entry) in fig.legend.entries.iter().enumerate() {
            let style = style_index(fig, &entry.solver)?;
            write!(
                w,
                "{} \\\n  NaN with linespoints ls {} title {} noenhanced",
                if index == 0 { "" } else { "," },
                style,
                label(fmt, &entry.label)
            )?
        }
        writeln!(w)?
    }
    Ok(())
}

/// Writes the gnuplot script of a figure.
///
/// The script renders to `output` unless `outfile` is defined when gnuplot
/// is called.
pub fn write_script<W: Write>(
    w: &mut W,
    fig: &Figure,
    conf: &FigureConf,
    fmt: PlotFmt,
    output: &str,
) -> Res<()> {
    let style = &conf.style;
    let layout = Layout::new(fig, style)?;

    writeln!(w, "# Generated by {} v{}", crate_name!(), crate_version!())?;
    writeln!(w)?;
    writeln!(w, "{}", fmt.term(style))?;
    writeln!(w, "if (!exists(\"outfile\")) outfile = {}", quoted(output))?;
    writeln!(w, "set output outfile")?;
    writeln!(w)?;

    for (coords, cell) in fig.cells.iter() {
        write_blocks(w, coords, cell)?
    }
    writeln!(w)?;

    for (index, (solver, encoding)) in fig.plan.encodings.iter().enumerate() {
        writeln!(
            w,
            "# {}\nset style line {} lc rgb \"{}\" lw {} dt 1 pt {} ps {}",
            solver.replace('\n', " "),
            index + 1,
            encoding.color,
            style.line_width,
            encoding.marker.pt(),
            style.marker_size
        )?
    }

    w.write_all(plot_prefix.as_bytes())?;
    writeln!(w, "set multiplot")?;

    for (coords, cell) in fig.cells.iter() {
        write_cell(w, &layout, fig, fmt, coords, cell)?
    }

    write_legend(w, &layout, fig, fmt)?;

    writeln!(w, "unset multiplot")?;
    Ok(())
}

/// Runs gnuplot on a script, rendering to a temporary file renamed to
/// `output` on success.
pub fn run<Conf: GConfExt>(conf: &Conf, script: &str, output: &str) -> Res<()> {
    conf.check_overwrite(output)?;
    let tmp = tmp_sibling(output);
    let tmp_str = tmp.to_string_lossy().into_owned();

    let res = Command::new("gnuplot")
        .arg("-e")
        .arg(format!("outfile = {}", quoted(&tmp_str)))
        .arg(script)
        .output()
        .chain_err(|| {
            ErrorKind::Render(output.into(), "could not run gnuplot, is it installed?".into())
        })
        .and_then(|out| {
            let stderr = String::from_utf8_lossy(&out.stderr);
            if !out.status.success() {
                bail!(render_err(
                    output,
                    format!("gnuplot {}\n{}", out.status, stderr.trim())
                ))
            }
            if !stderr.trim().is_empty() {
                log! { conf, verb =>
                    "  gnuplot says:" ;
                    { for line in stderr.lines() { println!("  | {}", line) } }
                }
            }
            if !file_exists(&tmp) {
                bail!(render_err(output, "gnuplot produced no output"))
            }
            ::std::fs::rename(&tmp, output).chain_err(|| {
                ErrorKind::Render(output.into(), "could not move the image in place".into())
            })
        });

    if res.is_err() {
        let _ = ::std::fs::remove_file(&tmp);
    }
    res
}

/// Runs a user command on the image.
pub fn then<Conf: GConfExt>(conf: &Conf, cmd: &str, output: &str) -> Res<()> {
    log! { conf, verb => "  running `{} {}`...", conf.emph(cmd), output }
    let status = Command::new(cmd)
        .arg(output)
        .status()
        .chain_err(|| format!("while running `{} {}`", conf.emph(cmd), output))?;
    if !status.success() {
        warn! { conf =>
            "command `{} {}` failed ({})", conf.sad(cmd), output, status
        }
    }
    Ok(())
}
