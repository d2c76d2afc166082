use std::fmt;

use rust_jpeg_header::jpeg::Header;

/// Human readable dump of a decoded header.
pub struct HeaderReport<'a>(pub &'a Header);

impl fmt::Display for HeaderReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.0;

        writeln!(f, "***** DQT *****")?;
        for (id, table) in header.populated_tables() {
            writeln!(f, "ID: {id}")?;
            for row in 0..8 {
                let values: Vec<String> = table
                    .row(row)
                    .iter()
                    .map(|value| format!("{value:>3}"))
                    .collect();
                writeln!(f, "{}", values.join(" "))?;
            }
            writeln!(f)?;
        }

        writeln!(f, "***** SOF *****")?;
        if header.has_frame() {
            writeln!(f, "FrameType: {:#x}", header.frame_type)?;
            writeln!(f, "Width: {}", header.width)?;
            writeln!(f, "Height: {}", header.height)?;
            writeln!(f, "ColorComponents: {}", header.component_count)?;
            for (id, component) in header.used_components() {
                writeln!(f, "ComponentId: {id}")?;
                writeln!(
                    f,
                    "Horizontal Sampling Factor: {}",
                    component.horizontal_sampling_factor
                )?;
                writeln!(
                    f,
                    "Vertical Sampling Factor: {}",
                    component.vertical_sampling_factor
                )?;
                writeln!(
                    f,
                    "Quantization Table ID: {}",
                    component.quantization_table_id
                )?;
            }
        } else {
            writeln!(f, "No frame header")?;
        }

        if !header.diagnostics.is_empty() {
            writeln!(f, "***** Diagnostics *****")?;
            for diagnostic in &header.diagnostics {
                writeln!(f, "{diagnostic}")?;
            }
        }
        Ok(())
    }
}
