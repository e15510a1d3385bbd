//! Animated svg export of a recorded sort.
//!
//! Each bar is one `<rect>` whose height (and vertical position, bars stand
//! on the bottom edge) jumps from frame to frame.

use crate::error::Result;
use crate::trace::SortTrace;
use itertools::Itertools;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// color of bars at rest
pub(crate) const BAR_COLOR: [f32; 3] = [0.2, 0.4, 0.9];
/// color of the bar touched by the current step
pub(crate) const HIGHLIGHT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// One bar: its place and its height in every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    /// x coordinate
    pub x: f64,
    /// width
    pub width: f64,
    /// height in each frame, the initial state first
    pub heights: Vec<f64>,
    /// is the bar the touched one in each frame
    pub highlighted: Vec<bool>,
}

/// Lay out the bars of a trace in a `width` x `height` box.
/// Negative magnitudes are drawn as empty bars.
pub fn layout<T, F>(trace: &SortTrace<T>, height_of: F, width: f64, height: f64) -> Vec<Bar>
where
    T: PartialEq,
    F: Fn(&T) -> f64,
{
    let count = trace.initial.len();
    if count == 0 {
        return Vec::new();
    }
    let frames: Vec<(&[T], Option<&T>)> = std::iter::once((trace.initial.as_slice(), None))
        .chain(
            trace
                .frames
                .iter()
                .map(|frame| (frame.values.as_slice(), frame.touched.as_ref())),
        )
        .collect();
    let tallest = frames
        .iter()
        .flat_map(|(values, _)| values.iter())
        .map(|value| height_of(value))
        .fold(0.0, f64::max);
    let yscale = if tallest > 0.0 { height / tallest } else { 0.0 };
    let bar_width = width / count as f64;
    (0..count)
        .map(|position| Bar {
            x: position as f64 * bar_width,
            width: bar_width,
            heights: frames
                .iter()
                .map(|(values, _)| {
                    values
                        .get(position)
                        .map(|value| height_of(value).max(0.0) * yscale)
                        .unwrap_or(0.0)
                })
                .collect(),
            highlighted: frames
                .iter()
                .map(|(values, touched)| touched.is_some() && values.get(position) == *touched)
                .collect(),
        })
        .collect()
}

fn rgb(color: [f32; 3]) -> String {
    format!(
        "rgb({},{},{})",
        (color[0] * 255.0) as u32,
        (color[1] * 255.0) as u32,
        (color[2] * 255.0) as u32
    )
}

/// Write bars as an animated svg.
/// duration is the total duration of the animation in seconds.
pub fn write_svg<W: Write>(
    bars: &[Bar],
    svg_width: u32,
    svg_height: u32,
    duration: u32,
    mut out: W,
) -> Result<()> {
    let bottom = f64::from(svg_height);
    // Header
    write!(
        out,
        "<?xml version=\"1.0\"?>
<svg width=\"{}\" height=\"{}\" version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\">
<rect width=\"100%\" height=\"100%\" fill=\"black\"/>\n",
        svg_width, svg_height,
    )?;
    for bar in bars {
        let first = bar.heights.first().copied().unwrap_or(0.0);
        write!(
            out,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\">\n",
            bar.x,
            bottom - first,
            bar.width,
            first,
            rgb(BAR_COLOR),
        )?;
        if bar.heights.len() > 1 {
            write!(
                out,
                "<animate attributeName=\"height\" values=\"{}\" dur=\"{}s\" calcMode=\"discrete\" fill=\"freeze\"/>
<animate attributeName=\"y\" values=\"{}\" dur=\"{}s\" calcMode=\"discrete\" fill=\"freeze\"/>
<animate attributeName=\"fill\" values=\"{}\" dur=\"{}s\" calcMode=\"discrete\" fill=\"freeze\"/>\n",
                bar.heights.iter().join(";"),
                duration,
                bar.heights.iter().map(|h| bottom - h).join(";"),
                duration,
                bar.highlighted
                    .iter()
                    .map(|&lit| rgb(if lit { HIGHLIGHT_COLOR } else { BAR_COLOR }))
                    .join(";"),
                duration,
            )?;
        }
        out.write_all(b"</rect>\n")?;
    }
    out.write_all(b"</svg>")?;
    Ok(())
}

/// Save an animated svg replaying the trace.
pub fn write_svg_file<T, F, P>(
    trace: &SortTrace<T>,
    height_of: F,
    svg_width: u32,
    svg_height: u32,
    duration: u32,
    path: P,
) -> Result<()>
where
    T: PartialEq,
    F: Fn(&T) -> f64,
    P: AsRef<Path>,
{
    let bars = layout(trace, height_of, f64::from(svg_width), f64::from(svg_height));
    let mut file = BufWriter::new(File::create(path)?);
    write_svg(&bars, svg_width, svg_height, duration, &mut file)?;
    file.flush()?;
    Ok(())
}
