//! `valentine layout`
//!
//! Prints the photo rain exactly as the montage would lay it out.

use std::io::Write;

use serde::Serialize;

use crate::cli::args::{LayoutArgs, OutputFormat};
use crate::error::ValentineError;
use crate::layout::RainItem;
use crate::photos::discover_photos;

#[derive(Debug, Serialize)]
struct LayoutReport<'a> {
    photos: &'a [String],
    items: &'a [RainItem],
}

/// Discovers photos and prints their layout.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or output fails.
pub fn run(args: &LayoutArgs) -> Result<(), ValentineError> {
    let mut config = super::load_experience(args.config.as_deref())?;
    if let Some(dir) = &args.photos {
        config.photos.dir.clone_from(dir);
    }

    let photos = discover_photos(&config.photos.dir, &config.photos.url_prefix);
    let items = config.layout.builder().build(&photos);
    tracing::info!(photos = photos.len(), items = items.len(), "layout built");

    let mut out = std::io::stdout().lock();
    match args.format {
        OutputFormat::Human => write_table(&mut out, &items)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &LayoutReport {
                photos: &photos,
                items: &items,
            })?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn write_table(out: &mut impl Write, items: &[RainItem]) -> std::io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "no photos found");
    }
    writeln!(
        out,
        "{:<32} {:>6} {:>6} {:>7} {:>6} {:>7} {:>4} {:>6} {:>6}",
        "id", "x%", "size", "dur(s)", "delay", "opacity", "blur", "tilt", "tilt2"
    )?;
    for item in items {
        writeln!(
            out,
            "{:<32} {:>6.2} {:>6.1} {:>7.2} {:>6.2} {:>7.2} {:>4.1} {:>6.1} {:>6.1}",
            item.id,
            item.x,
            item.size,
            item.duration,
            item.delay,
            item.opacity,
            item.blur,
            item.tilt,
            item.tilt_alt
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::RainLayoutBuilder;

    #[test]
    fn test_table_has_row_per_item() {
        let items = RainLayoutBuilder::new().build(&["/photos/a.jpg"]);
        let mut out = Vec::new();
        write_table(&mut out, &items).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), items.len() + 1);
        assert!(text.contains("/photos/a.jpg-0"));
    }

    #[test]
    fn test_table_without_photos() {
        let mut out = Vec::new();
        write_table(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "no photos found\n");
    }
}
