use std::error::Error;
use std::path::{Path, PathBuf};

use otoc_core::{
    Experiment, Model, ModelFamily, Regime, noise_floor, omega_uncertainty, signal_noise,
    uniform_floor,
};
use plotters::coord::Shift;
use plotters::coord::combinators::WithKeyPoints;
use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use plotters::style::FontStyle;

use super::CommandResult;

/// Nominal resolution of the SVG canvas; text scales from points at this density.
const SVG_DPI: u32 = 96;

/// Deep-circuit cutoff for the noise floor figure.
const DEEP_MIN_DEPTH: u32 = 6;

const C_EXACT: RGBColor = RGBColor(0x1b, 0x1b, 0x1b);
const C_KI: RGBColor = RGBColor(214, 39, 40);
const C_INT: RGBColor = RGBColor(44, 160, 44);
const C_FLOQ: RGBColor = RGBColor(255, 127, 14);
const C_SYK: RGBColor = RGBColor(148, 103, 189);
const C_IBM: RGBColor = RGBColor(31, 119, 180);
const C_GUIDE: RGBColor = RGBColor(128, 128, 128);

/// `WithKeyPoints<RangedCoordf64>` that satisfies plotters' `ValueFormatter` bound.
///
/// plotters 0.3 forwards `FormatOption` from the inner f64 range, which leaves the
/// combinator without a formatter; this delegates everything and reuses f64's formatter.
struct KeyPointsF64(WithKeyPoints<RangedCoordf64>);

impl Ranged for KeyPointsF64 {
    type ValueType = f64;
    type FormatOption = NoDefaultFormatting;

    fn range(&self) -> std::ops::Range<f64> {
        self.0.range()
    }

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.0.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        self.0.key_points(hint)
    }

    fn axis_pixel_range(&self, limit: (i32, i32)) -> std::ops::Range<i32> {
        self.0.axis_pixel_range(limit)
    }
}

impl ValueFormatter<f64> for KeyPointsF64 {
    fn format(value: &f64) -> String {
        <RangedCoordf64 as ValueFormatter<f64>>::format(value)
    }
}

pub struct FiguresCommandConfig<'a> {
    pub out_dir: &'a str,
    pub dpi: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    OtocAllModels,
    ScalingN,
    Classification,
    NoiseFloor,
}

impl Figure {
    pub const ALL: [Figure; 4] = [
        Figure::OtocAllModels,
        Figure::ScalingN,
        Figure::Classification,
        Figure::NoiseFloor,
    ];

    pub fn stem(self) -> &'static str {
        match self {
            Figure::OtocAllModels => "fig1_otoc_all_models",
            Figure::ScalingN => "fig2_scaling_N",
            Figure::Classification => "fig3_classification",
            Figure::NoiseFloor => "fig4_noise_floor",
        }
    }

    /// Canvas size in inches.
    pub fn size_inches(self) -> (f64, f64) {
        match self {
            Figure::OtocAllModels => (12.0, 10.0),
            Figure::ScalingN => (13.0, 5.5),
            Figure::Classification => (10.0, 5.0),
            Figure::NoiseFloor => (12.0, 5.0),
        }
    }

    pub fn pixels(self, dpi: u32) -> (u32, u32) {
        let (w, h) = self.size_inches();
        let dpi = f64::from(dpi);
        ((w * dpi).round() as u32, (h * dpi).round() as u32)
    }
}

pub fn run(config: FiguresCommandConfig<'_>) -> CommandResult {
    if config.dpi == 0 {
        return Err("--dpi must be positive".into());
    }
    let experiment = super::load_experiment()?;
    let out_dir = Path::new(config.out_dir);
    std::fs::create_dir_all(out_dir)
        .map_err(|e| format!("failed to create {}: {e}", out_dir.display()))?;

    for figure in Figure::ALL {
        println!("Rendering {}...", figure.stem());
        let written = render(&experiment, figure, out_dir, config.dpi)?;
        for path in written {
            println!("  → {} ✓", path.display());
        }
    }
    println!("\nAll figures at {} DPI (PNG) plus SVG.", config.dpi);
    Ok(())
}

/// Render one figure as PNG at `dpi` and as SVG. Returns the written paths.
pub fn render(
    exp: &Experiment,
    figure: Figure,
    out_dir: &Path,
    dpi: u32,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let png = out_dir.join(format!("{}.png", figure.stem()));
    {
        let root = BitMapBackend::new(&png, figure.pixels(dpi)).into_drawing_area();
        draw(&root, exp, figure, &Style::at_dpi(dpi))?;
    }
    log::info!("wrote {}", png.display());

    let svg = out_dir.join(format!("{}.svg", figure.stem()));
    {
        let root = SVGBackend::new(&svg, figure.pixels(SVG_DPI)).into_drawing_area();
        draw(&root, exp, figure, &Style::at_dpi(SVG_DPI))?;
    }
    log::info!("wrote {}", svg.display());

    Ok(vec![png, svg])
}

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

/// Converts typographic points into backend pixels.
struct Style {
    scale: f64,
}

impl Style {
    fn at_dpi(dpi: u32) -> Self {
        Self {
            scale: f64::from(dpi) / 72.0,
        }
    }

    fn px(&self, pt: f64) -> u32 {
        (pt * self.scale).round().max(1.0) as u32
    }

    fn font(&self, pt: f64) -> FontDesc<'static> {
        ("sans-serif", pt * self.scale).into_font()
    }

    fn bold(&self, pt: f64) -> FontDesc<'static> {
        ("sans-serif", pt * self.scale, FontStyle::Bold).into_font()
    }

    fn italic(&self, pt: f64) -> FontDesc<'static> {
        ("sans-serif", pt * self.scale, FontStyle::Italic).into_font()
    }
}

fn draw<DB>(
    root: &DrawingArea<DB, Shift>,
    exp: &Experiment,
    figure: Figure,
    style: &Style,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    match figure {
        Figure::OtocAllModels => otoc_all_models(root, exp, style)?,
        Figure::ScalingN => scaling_n(root, exp, style)?,
        Figure::Classification => classification(root, exp, style)?,
        Figure::NoiseFloor => noise_floor_figure(root, exp, style)?,
    }
    root.present()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Data preparation
// ---------------------------------------------------------------------------

/// One group of the classification bar chart.
#[derive(Debug, Clone, PartialEq)]
struct OmegaBar {
    label: String,
    exact: Option<f64>,
    hardware: f64,
}

/// Kicked Ising from largest to smallest N, then SYK, Floquet, integrable.
fn omega_bars(exp: &Experiment) -> Result<Vec<OmegaBar>, Box<dyn Error>> {
    let mut models: Vec<&Model> = exp.kicked_ising().into_iter().rev().collect();
    for family in [ModelFamily::Syk, ModelFamily::Floquet, ModelFamily::Integrable] {
        models.extend(exp.models.iter().filter(|m| m.family == family));
    }

    let mut bars = Vec::with_capacity(models.len());
    for m in models {
        let label = if m.family == ModelFamily::Syk {
            format!("{} ({} seeds)", m.label, m.runs.len())
        } else {
            m.label.clone()
        };
        let exact = match &m.exact {
            Some(_) => Some(m.omega_exact()?.omega),
            None => None,
        };
        bars.push(OmegaBar {
            label,
            exact,
            hardware: m.omega_hardware()?.omega,
        });
    }
    Ok(bars)
}

/// Raise non-positive or tiny values to the bottom of a log axis.
fn log_clamp(value: f64, axis_min: f64) -> f64 {
    if value.is_finite() && value > axis_min {
        value
    } else {
        axis_min
    }
}

/// The 2/2^N guide over N in [4, 20], ending where it leaves a log axis at `y_min`.
fn scaling_guide(y_min: f64) -> Vec<(f64, f64)> {
    (0..=100)
        .map(|i| {
            let n = 4.0 + 16.0 * f64::from(i) / 100.0;
            (n, 2.0 / 2f64.powf(n))
        })
        .take_while(|&(_, v)| v >= y_min)
        .collect()
}

fn depth_points(depths: &[u32], values: &[f64]) -> Vec<(f64, f64)> {
    depths
        .iter()
        .zip(values)
        .map(|(&d, &v)| (f64::from(d), v))
        .collect()
}

fn family_color(family: ModelFamily) -> RGBColor {
    match family {
        ModelFamily::KickedIsing => C_KI,
        ModelFamily::Integrable => C_INT,
        ModelFamily::Floquet => C_FLOQ,
        ModelFamily::Syk => C_SYK,
    }
}

fn size_color(system_size: u32) -> RGBColor {
    match system_size {
        4 => C_KI,
        8 => C_FLOQ,
        12 => C_INT,
        _ => C_IBM,
    }
}

/// Fill color, fill alpha, label color for each regime band.
fn regime_palette(regime: Regime) -> (RGBColor, f64, RGBColor) {
    match regime {
        Regime::CompleteScrambling => (RGBColor(255, 0, 0), 0.08, RGBColor(139, 0, 0)),
        Regime::StrongScrambling => (RGBColor(255, 165, 0), 0.06, RGBColor(255, 140, 0)),
        Regime::Intermediate => (RGBColor(255, 255, 0), 0.05, RGBColor(128, 128, 0)),
        Regime::WeakScrambling => (RGBColor(0, 128, 0), 0.04, RGBColor(0, 100, 0)),
        Regime::NoScrambling => (RGBColor(0, 0, 255), 0.04, RGBColor(0, 0, 139)),
    }
}

// ---------------------------------------------------------------------------
// Figure 1: C(d) for every N=4 model
// ---------------------------------------------------------------------------

fn otoc_all_models<DB>(
    root: &DrawingArea<DB, Shift>,
    exp: &Experiment,
    style: &Style,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let title = format!(
        "Figure 1: OTOC C(d), exact simulation vs hardware ({})",
        exp.backend
    );
    let body = root.titled(&title, style.bold(14.0))?;
    let panels = body.split_evenly((2, 2));

    let families = [
        ModelFamily::KickedIsing,
        ModelFamily::Integrable,
        ModelFamily::Floquet,
        ModelFamily::Syk,
    ];
    let letters = ["(a)", "(b)", "(c)", "(d)"];

    for ((family, letter), area) in families.iter().zip(letters).zip(&panels) {
        // Smallest system of each family.
        let Some(model) = exp
            .models
            .iter()
            .filter(|m| m.family == *family)
            .min_by_key(|m| m.system_size)
        else {
            log::warn!("no {family} model in dataset; panel {letter} left empty");
            continue;
        };
        otoc_panel(area, exp, model, letter, style)?;
    }
    Ok(())
}

fn otoc_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    exp: &Experiment,
    model: &Model,
    letter: &str,
    style: &Style,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let stats = model.stats()?;
    let color = family_color(model.family);
    let mean = stats.mean.values();
    let std = stats.std_dev.values();

    let mut y_max: f64 = 0.55;
    for (m, s) in mean.iter().zip(std) {
        y_max = y_max.max(m + s);
    }
    if let Some(exact) = &model.exact {
        y_max = exact.values().iter().fold(y_max, |a, &b| a.max(b));
    }

    let caption = if model.family == ModelFamily::Syk {
        format!(
            "{letter} {} ({} disorder realizations)",
            model.label,
            model.runs.len()
        )
    } else {
        format!("{letter} {}", model.label)
    };

    let mut chart = ChartBuilder::on(area)
        .caption(caption, style.font(12.0))
        .margin(style.px(8.0))
        .x_label_area_size(style.px(30.0))
        .y_label_area_size(style.px(44.0))
        .build_cartesian_2d(0f64..15f64, -0.02f64..y_max * 1.05)?;

    chart
        .configure_mesh()
        .x_desc("Circuit depth d")
        .y_desc("C(d) = |⟨0|ψ⟩|²")
        .label_style(style.font(9.0))
        .axis_desc_style(style.font(10.0))
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .draw()?;

    chart.draw_series(LineSeries::new(
        [(0.0, 0.0), (15.0, 0.0)],
        C_GUIDE.stroke_width(style.px(0.5)),
    ))?;

    let marker = style.px(2.5);
    let cap = style.px(6.0);
    let legend_len = style.px(14.0) as i32;

    if model.family == ModelFamily::Syk {
        for (i, run) in model.runs.iter().enumerate() {
            let faint = color.mix(0.15);
            let series = chart.draw_series(LineSeries::new(
                depth_points(&exp.depths, run.values.values()),
                faint.stroke_width(style.px(0.5)),
            ))?;
            if i == 0 {
                series.label("Individual seeds").legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + legend_len, y)], faint)
                });
            }
        }
        chart.draw_series(LineSeries::new(
            depth_points(&exp.depths, mean),
            BLACK.stroke_width(style.px(1.5)),
        ))?;
        chart
            .draw_series(exp.depths.iter().zip(mean.iter().zip(std)).map(|(&d, (&m, &s))| {
                ErrorBar::new_vertical(
                    f64::from(d),
                    m - s,
                    m,
                    m + s,
                    BLACK.stroke_width(style.px(1.0)),
                    cap,
                )
            }))?
            .label(format!("Disorder average ({} seeds)", model.runs.len()))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], BLACK));
    } else {
        let exact = model.exact()?;
        let exact_points = depth_points(&exp.depths, exact.values());
        chart
            .draw_series(LineSeries::new(
                exact_points.clone(),
                C_EXACT.stroke_width(style.px(1.5)),
            ))?
            .label("Exact (statevector)")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], C_EXACT));
        chart.draw_series(
            exact_points
                .iter()
                .map(|&p| Circle::new(p, marker, C_EXACT.filled())),
        )?;

        chart
            .draw_series(exp.depths.iter().zip(mean.iter().zip(std)).map(|(&d, (&m, &s))| {
                ErrorBar::new_vertical(
                    f64::from(d),
                    m - s,
                    m,
                    m + s,
                    color.stroke_width(style.px(1.2)),
                    cap,
                )
            }))?
            .label(format!("Hardware ({} runs)", model.runs.len()))
            .legend(move |(x, y)| {
                Rectangle::new([(x + 4, y - 4), (x + 12, y + 4)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(style.font(9.0))
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Figure 2: kicked Ising scaling with N
// ---------------------------------------------------------------------------

fn scaling_n<DB>(
    root: &DrawingArea<DB, Shift>,
    exp: &Experiment,
    style: &Style,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let body = root.titled(
        "Figure 2: Kicked Ising scaling with system size N",
        style.bold(14.0),
    )?;
    let panels = body.split_evenly((1, 2));
    let ki = exp.kicked_ising();
    let legend_len = style.px(14.0) as i32;
    let cap = style.px(5.0);

    // (a) C(d) per N on a log axis.
    let y_min = 1e-5;
    let mut chart = ChartBuilder::on(&panels[0])
        .caption("(a) C(d) vs depth, hardware data", style.font(12.0))
        .margin(style.px(8.0))
        .x_label_area_size(style.px(30.0))
        .y_label_area_size(style.px(50.0))
        .build_cartesian_2d(0f64..15f64, (y_min..1f64).log_scale())?;
    chart
        .configure_mesh()
        .x_desc("Circuit depth d")
        .y_desc("C(d)")
        .y_label_formatter(&|v| format!("{v:.0e}"))
        .label_style(style.font(9.0))
        .axis_desc_style(style.font(10.0))
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .draw()?;

    for m in &ki {
        let color = size_color(m.system_size);
        let stats = m.stats()?;
        let exact = m.exact()?;
        chart.draw_series(LineSeries::new(
            depth_points(&exp.depths, exact.values())
                .into_iter()
                .map(|(d, v)| (d, log_clamp(v, y_min))),
            color.mix(0.4).stroke_width(style.px(1.0)),
        ))?;

        let bars = exp
            .depths
            .iter()
            .zip(stats.mean.values().iter().zip(stats.std_dev.values()))
            .map(|(&d, (&mean, &s))| {
                ErrorBar::new_vertical(
                    f64::from(d),
                    log_clamp(mean - s, y_min),
                    log_clamp(mean, y_min),
                    log_clamp(mean + s, y_min),
                    color.stroke_width(style.px(1.0)),
                    cap,
                )
            });
        chart
            .draw_series(bars)?
            .label(format!("N={}", m.system_size))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], color));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(style.font(9.0))
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;

    // (b) Ω vs N with regime bands.
    let y_min = 1e-3;
    let y_max = 0.5;
    let sizes: Vec<f64> = ki.iter().map(|m| f64::from(m.system_size)).collect();
    let mut chart = ChartBuilder::on(&panels[1])
        .caption("(b) Scrambling parameter Ω vs N", style.font(12.0))
        .margin(style.px(8.0))
        .x_label_area_size(style.px(30.0))
        .y_label_area_size(style.px(50.0))
        .build_cartesian_2d(
            KeyPointsF64((2f64..22f64).with_key_points(sizes.clone())),
            (y_min..y_max).log_scale(),
        )?;
    chart
        .configure_mesh()
        .x_desc("System size N")
        .y_desc("Ω = ⟨C⟩/C₀")
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.0e}"))
        .label_style(style.font(9.0))
        .axis_desc_style(style.font(10.0))
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .draw()?;

    for regime in [Regime::CompleteScrambling, Regime::StrongScrambling] {
        let (lo, hi) = regime.band();
        let (fill, alpha, _) = regime_palette(regime);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(2.0, log_clamp(lo, y_min)), (22.0, hi.min(y_max))],
            fill.mix(alpha).filled(),
        )))?;
    }
    let (_, _, complete) = regime_palette(Regime::CompleteScrambling);
    let (_, _, strong) = regime_palette(Regime::StrongScrambling);
    chart.draw_series([
        Text::new(
            "Complete scrambling",
            (15.5, 0.003),
            style.italic(8.0).color(&complete),
        ),
        Text::new("Strong", (15.5, 0.08), style.italic(8.0).color(&strong)),
    ])?;

    chart
        .draw_series(LineSeries::new(
            scaling_guide(y_min),
            C_GUIDE.mix(0.5).stroke_width(style.px(1.0)),
        ))?
        .label("~ 1/2ᴺ (guide)")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], C_GUIDE));

    let mut exact_points = Vec::with_capacity(ki.len());
    let mut hardware = Vec::with_capacity(ki.len());
    for m in &ki {
        let n = f64::from(m.system_size);
        let stats = m.stats()?;
        exact_points.push((n, log_clamp(m.omega_exact()?.omega, y_min)));
        hardware.push((
            n,
            m.omega_hardware()?.omega,
            omega_uncertainty(&stats.std_dev)?,
        ));
    }

    chart
        .draw_series(LineSeries::new(
            exact_points.clone(),
            C_EXACT.stroke_width(style.px(2.0)),
        ))?
        .label("Exact simulation")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], C_EXACT));
    chart.draw_series(
        exact_points
            .iter()
            .map(|&p| Circle::new(p, style.px(4.0), C_EXACT.filled())),
    )?;

    chart
        .draw_series(LineSeries::new(
            hardware.iter().map(|&(n, o, _)| (n, log_clamp(o, y_min))),
            C_IBM.stroke_width(style.px(2.0)),
        ))?
        .label("Hardware")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], C_IBM));
    chart.draw_series(hardware.iter().map(|&(n, o, err)| {
        ErrorBar::new_vertical(
            n,
            log_clamp(o - err, y_min),
            log_clamp(o, y_min),
            log_clamp(o + err, y_min),
            C_IBM.stroke_width(style.px(1.5)),
            style.px(8.0),
        )
    }))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(style.font(9.0))
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Figure 3: Ω classification bars
// ---------------------------------------------------------------------------

fn classification<DB>(
    root: &DrawingArea<DB, Shift>,
    exp: &Experiment,
    style: &Style,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let bars = omega_bars(exp)?;
    let labels: Vec<String> = bars.iter().map(|b| b.label.clone()).collect();
    let count = bars.len() as f64;
    let width = 0.35;
    let y_max = 0.95;
    let x_right = count + 1.3;
    let legend_len = style.px(10.0) as i32;

    let mut chart = ChartBuilder::on(root)
        .caption(
            "Figure 3: Scrambling classification, exact vs hardware",
            style.bold(13.0),
        )
        .margin(style.px(8.0))
        .x_label_area_size(style.px(30.0))
        .y_label_area_size(style.px(44.0))
        .build_cartesian_2d(
            KeyPointsF64((-0.6f64..x_right).with_key_points((0..bars.len()).map(|i| i as f64).collect())),
            0f64..y_max,
        )?;

    let label_of = |v: &f64| {
        let i = v.round();
        if i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Ω = ⟨C(d)⟩ / C₀")
        .x_label_formatter(&label_of)
        .label_style(style.font(9.0))
        .axis_desc_style(style.font(10.0))
        .light_line_style(BLACK.mix(0.03))
        .bold_line_style(BLACK.mix(0.12))
        .draw()?;

    for regime in Regime::ALL {
        let (lo, hi) = regime.band();
        let (fill, alpha, text) = regime_palette(regime);
        chart.draw_series(std::iter::once(Rectangle::new(
            [(-0.6, lo), (x_right, hi.min(y_max))],
            fill.mix(alpha).filled(),
        )))?;
        let mid = if hi.is_finite() { (lo + hi) / 2.0 } else { 0.80 };
        chart.draw_series(std::iter::once(Text::new(
            regime.label(),
            (count - 0.2, mid),
            style.italic(8.0).color(&text),
        )))?;
    }

    let edge = BLACK.stroke_width(style.px(0.5));
    chart
        .draw_series(bars.iter().enumerate().filter_map(|(i, b)| {
            b.exact.map(|omega| {
                let x = i as f64;
                Rectangle::new([(x - width, 0.0), (x, omega)], C_EXACT.mix(0.7).filled())
            })
        }))?
        .label("Exact simulation")
        .legend(move |(x, y)| {
            Rectangle::new([(x, y - 5), (x + legend_len, y + 5)], C_EXACT.mix(0.7).filled())
        });
    chart
        .draw_series(bars.iter().enumerate().map(|(i, b)| {
            let x = i as f64;
            Rectangle::new([(x, 0.0), (x + width, b.hardware)], C_IBM.mix(0.7).filled())
        }))?
        .label(format!("Hardware ({})", exp.backend))
        .legend(move |(x, y)| {
            Rectangle::new([(x, y - 5), (x + legend_len, y + 5)], C_IBM.mix(0.7).filled())
        });

    // Outlines on top of the fills.
    chart.draw_series(bars.iter().enumerate().flat_map(|(i, b)| {
        let x = i as f64;
        let hw = Rectangle::new([(x, 0.0), (x + width, b.hardware)], edge);
        let ex = b
            .exact
            .map(|omega| Rectangle::new([(x - width, 0.0), (x, omega)], edge));
        std::iter::once(hw).chain(ex)
    }))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(style.font(9.0))
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Figure 4: noise floor
// ---------------------------------------------------------------------------

fn noise_floor_figure<DB>(
    root: &DrawingArea<DB, Shift>,
    exp: &Experiment,
    style: &Style,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let body = root.titled(
        "Figure 4: Hardware noise floor characterization",
        style.bold(14.0),
    )?;
    let panels = body.split_evenly((1, 2));
    let ki = exp.kicked_ising();
    let legend_len = style.px(14.0) as i32;

    // (a) deep-circuit means vs N.
    let y_min = 1e-7;
    let mut hw = Vec::with_capacity(ki.len());
    let mut exact = Vec::with_capacity(ki.len());
    let mut uniform = Vec::with_capacity(ki.len());
    for m in &ki {
        let floor = noise_floor(&exp.depths, m, DEEP_MIN_DEPTH)?;
        let n = f64::from(floor.system_size);
        hw.push((n, log_clamp(floor.hardware_deep_mean, y_min)));
        if let Some(e) = floor.exact_deep_mean {
            exact.push((n, log_clamp(e, y_min)));
        }
        uniform.push((n, floor.uniform_floor));
    }
    let sizes: Vec<f64> = ki.iter().map(|m| f64::from(m.system_size)).collect();

    let mut chart = ChartBuilder::on(&panels[0])
        .caption("(a) Deep-circuit noise floor", style.font(12.0))
        .margin(style.px(8.0))
        .x_label_area_size(style.px(30.0))
        .y_label_area_size(style.px(50.0))
        .build_cartesian_2d(
            KeyPointsF64((2f64..22f64).with_key_points(sizes)),
            (y_min..0.2f64).log_scale(),
        )?;
    chart
        .configure_mesh()
        .x_desc("System size N")
        .y_desc(format!("⟨C(d ≥ {DEEP_MIN_DEPTH})⟩"))
        .x_label_formatter(&|v| format!("{v:.0}"))
        .y_label_formatter(&|v| format!("{v:.0e}"))
        .label_style(style.font(9.0))
        .axis_desc_style(style.font(10.0))
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.15))
        .draw()?;

    let dot = style.px(4.0);
    chart
        .draw_series(LineSeries::new(hw.clone(), C_IBM.stroke_width(style.px(2.0))))?
        .label(format!("Hardware ⟨C(d≥{DEEP_MIN_DEPTH})⟩"))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], C_IBM));
    chart.draw_series(hw.iter().map(|&p| Circle::new(p, dot, C_IBM.filled())))?;

    chart
        .draw_series(LineSeries::new(
            exact.clone(),
            C_EXACT.stroke_width(style.px(1.5)),
        ))?
        .label(format!("Exact ⟨C(d≥{DEEP_MIN_DEPTH})⟩"))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], C_EXACT));
    chart.draw_series(exact.iter().map(|&(x, y)| {
        EmptyElement::at((x, y)) + Rectangle::new([(-4, -4), (4, 4)], C_EXACT.filled())
    }))?;

    chart
        .draw_series(LineSeries::new(
            uniform.clone(),
            C_GUIDE.stroke_width(style.px(1.5)),
        ))?
        .label("1/2ᴺ (uniform noise)")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], C_GUIDE));
    chart.draw_series(
        uniform
            .iter()
            .map(|&p| TriangleMarker::new(p, dot, C_GUIDE.filled())),
    )?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(style.font(9.0))
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;

    // (b) signal vs |noise| for the smallest kicked Ising system.
    let Some(smallest) = ki.first() else {
        log::warn!("no kicked Ising model in dataset; panel (b) left empty");
        return Ok(());
    };
    let rows = signal_noise(&exp.depths, smallest)?;
    let floor = uniform_floor(smallest.system_size);
    let y_max = rows
        .iter()
        .map(|r| r.signal.max(r.noise))
        .fold(floor, f64::max)
        * 1.1;
    let depth_labels: Vec<String> = rows.iter().map(|r| r.depth.to_string()).collect();
    let width = 0.35;

    let mut chart = ChartBuilder::on(&panels[1])
        .caption(
            format!("(b) {}: signal vs noise decomposition", smallest.label),
            style.font(12.0),
        )
        .margin(style.px(8.0))
        .x_label_area_size(style.px(30.0))
        .y_label_area_size(style.px(44.0))
        .build_cartesian_2d(
            KeyPointsF64(
                (-0.6f64..rows.len() as f64 - 0.4)
                    .with_key_points((0..rows.len()).map(|i| i as f64).collect()),
            ),
            0f64..y_max,
        )?;
    let label_of = |v: &f64| {
        let i = v.round();
        if i < 0.0 {
            return String::new();
        }
        depth_labels.get(i as usize).cloned().unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Circuit depth d")
        .y_desc("C(d)")
        .x_label_formatter(&label_of)
        .label_style(style.font(9.0))
        .axis_desc_style(style.font(10.0))
        .light_line_style(BLACK.mix(0.03))
        .bold_line_style(BLACK.mix(0.12))
        .draw()?;

    chart
        .draw_series(rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64 - 0.2;
            Rectangle::new(
                [(x - width / 2.0, 0.0), (x + width / 2.0, r.signal)],
                C_EXACT.mix(0.7).filled(),
            )
        }))?
        .label("Signal (exact C(d))")
        .legend(move |(x, y)| {
            Rectangle::new([(x, y - 5), (x + 10, y + 5)], C_EXACT.mix(0.7).filled())
        });
    chart
        .draw_series(rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64 + 0.2;
            Rectangle::new(
                [(x - width / 2.0, 0.0), (x + width / 2.0, r.noise)],
                C_KI.mix(0.5).filled(),
            )
        }))?
        .label("|Noise| (hardware − exact)")
        .legend(move |(x, y)| {
            Rectangle::new([(x, y - 5), (x + 10, y + 5)], C_KI.mix(0.5).filled())
        });
    chart
        .draw_series(LineSeries::new(
            [(-0.6, floor), (rows.len() as f64 - 0.4, floor)],
            C_GUIDE.stroke_width(style.px(1.0)),
        ))?
        .label(format!("1/2^{} = {floor:.4}", smallest.system_size))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], C_GUIDE));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font(style.font(8.0))
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}
