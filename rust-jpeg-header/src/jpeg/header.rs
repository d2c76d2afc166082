use std::io::Read;

use crate::{
    diagnostic::Diagnostic,
    error::{ColorMode, Error, Result},
    jpeg::{jpeg_core::ZIGZAG_MAP, jpeg_reader::JPEGReader, options::DecodeOptions},
};

/// Coefficient width of a quantization table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    /// One byte per coefficient, selected by a zero precision nibble
    #[default]
    Bits8,
    /// Two big-endian bytes per coefficient
    Bits16,
}

impl Precision {
    fn from_nibble(nibble: u8) -> Self {
        if nibble == 0 {
            Precision::Bits8
        } else {
            Precision::Bits16
        }
    }

    /// Bytes taken by the 64 coefficients.
    pub fn table_size(self) -> i32 {
        match self {
            Precision::Bits8 => 64,
            Precision::Bits16 => 128,
        }
    }
}

/// A quantization table in natural (row-major 8x8) order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationTable {
    /// Set once all 64 coefficients have been read
    pub populated: bool,
    /// Encoding the coefficients were read with
    pub precision: Precision,
    /// Coefficients in natural order
    pub values: [u16; 64],
}

impl Default for QuantizationTable {
    fn default() -> Self {
        Self {
            populated: false,
            precision: Precision::Bits8,
            values: [0; 64],
        }
    }
}

impl QuantizationTable {
    /// Returns row `row` (0..8) of the table.
    pub fn row(&self, row: usize) -> &[u16] {
        &self.values[row * 8..row * 8 + 8]
    }
}

/// Sampling and table assignment of one color component.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ColorComponent {
    /// High nibble of the sampling byte
    pub horizontal_sampling_factor: u8,
    /// Low nibble of the sampling byte
    pub vertical_sampling_factor: u8,
    /// Quantization table slot, 0 to 3
    pub quantization_table_id: u8,
    /// Set once a component with this slot's id has been seen
    pub used: bool,
}

/// Everything decoded from the marker segments of one file.
#[derive(Debug, Default, Clone)]
pub struct Header {
    /// Marker tag of the frame header, 0xC0 for baseline
    pub frame_type: u8,
    /// Image width in pixels
    pub width: u16,
    /// Image height in pixels
    pub height: u16,
    /// Number of color components, zero until a frame header is decoded
    pub component_count: u8,
    /// Quantization tables by id
    pub quantization_tables: [QuantizationTable; 4],
    /// Color components, slot `n` holds component id `n + 1`
    pub color_components: [ColorComponent; 3],
    /// Violations found so far
    pub diagnostics: Vec<Diagnostic>,
}

/// A decoded SOF0 segment that has not been committed to the header yet.
struct Frame {
    width: u16,
    height: u16,
    component_count: u8,
    components: [ColorComponent; 3],
    warnings: Vec<Diagnostic>,
}

impl Header {
    /// Creates an empty header.
    pub fn new() -> Self {
        Default::default()
    }

    /// True if decoding recorded no violation at all.
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// True once a frame header has been decoded.
    pub fn has_frame(&self) -> bool {
        self.component_count != 0
    }

    /// Iterates over the populated quantization tables with their ids.
    pub fn populated_tables(&self) -> impl Iterator<Item = (usize, &QuantizationTable)> {
        self.quantization_tables
            .iter()
            .enumerate()
            .filter(|(_, table)| table.populated)
    }

    /// Iterates over the used color components with their ids.
    pub fn used_components(&self) -> impl Iterator<Item = (u8, &ColorComponent)> {
        self.color_components
            .iter()
            .zip(1u8..)
            .filter(|(component, _)| component.used)
            .map(|(component, id)| (id, component))
    }

    /// Decodes a DQT segment, which may pack several tables back to back.
    /// The reader is positioned right after the marker.
    pub(crate) fn read_quantization_tables<R: Read>(
        &mut self,
        reader: &mut JPEGReader<R>,
    ) -> Result<()> {
        let mut remaining = i32::from(reader.read_next_word()?) - 2;

        while remaining > 0 {
            let table_info = reader.read_next_byte()?;
            remaining -= 1;

            let table_id = table_info & 0x0F;
            if table_id > 3 {
                return Err(Error::InvalidQuantizationTableId(table_id));
            }

            let precision = Precision::from_nibble(table_info >> 4);
            let mut zagged_table = [0u16; 64];
            for value in zagged_table.iter_mut() {
                *value = match precision {
                    Precision::Bits8 => u16::from(reader.read_next_byte()?),
                    Precision::Bits16 => reader.read_next_word()?,
                };
            }

            let table = &mut self.quantization_tables[table_id as usize];
            for (i, value) in zagged_table.iter().enumerate() {
                table.values[ZIGZAG_MAP[i]] = *value;
            }
            table.precision = precision;
            table.populated = true;
            remaining -= precision.table_size();

            log::debug!("jpeg: quantization table {} ({:?})", table_id, precision);
        }

        if remaining != 0 {
            return Err(Error::InvalidDqtSegment { remaining });
        }
        Ok(())
    }

    /// Decodes a baseline SOF0 segment. The reader is positioned right after
    /// the marker.
    ///
    /// Nothing is written to the header unless the whole segment is valid.
    /// Unsupported sampling factors only add a warning, unless
    /// `options.strict_sampling` is set.
    pub(crate) fn read_start_of_frame<R: Read>(
        &mut self,
        reader: &mut JPEGReader<R>,
        frame_type: u8,
        offset: u64,
        options: &DecodeOptions,
    ) -> Result<()> {
        if self.has_frame() {
            return Err(Error::DuplicateFrameHeader);
        }

        let frame = Self::read_frame(reader, offset, options)?;

        self.frame_type = frame_type;
        self.width = frame.width;
        self.height = frame.height;
        self.component_count = frame.component_count;
        self.color_components = frame.components;
        self.diagnostics.extend(frame.warnings);

        log::info!(
            "jpeg: frame {}x{} with {} components",
            self.width,
            self.height,
            self.component_count
        );
        Ok(())
    }

    fn read_frame<R: Read>(
        reader: &mut JPEGReader<R>,
        offset: u64,
        options: &DecodeOptions,
    ) -> Result<Frame> {
        let length = reader.read_next_word()?;

        let precision = reader.read_next_byte()?;
        if precision != 8 {
            return Err(Error::UnsupportedPrecision(precision));
        }

        let height = reader.read_next_word()?;
        let width = reader.read_next_word()?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }

        let component_count = reader.read_next_byte()?;
        match component_count {
            1..=3 => {}
            4 => return Err(Error::UnsupportedColorMode(ColorMode::Cmyk)),
            _ => return Err(Error::InvalidComponentCount(component_count)),
        }

        let mut components = [ColorComponent::default(); 3];
        let mut warnings = Vec::new();

        for _ in 0..component_count {
            let identifier = reader.read_next_byte()?;
            match identifier {
                4 | 5 => return Err(Error::UnsupportedColorMode(ColorMode::Yiq)),
                1..=3 => {}
                _ => return Err(Error::InvalidComponentId(identifier)),
            }

            let component = &mut components[identifier as usize - 1];
            if component.used {
                return Err(Error::DuplicateComponentId(identifier));
            }
            component.used = true;

            let sample_factors = reader.read_next_byte()?;
            component.horizontal_sampling_factor = sample_factors >> 4;
            component.vertical_sampling_factor = sample_factors & 0x0F;
            if component.horizontal_sampling_factor != 1 || component.vertical_sampling_factor != 1
            {
                let violation = Error::UnsupportedSamplingFactor {
                    component_id: identifier,
                    horizontal: component.horizontal_sampling_factor,
                    vertical: component.vertical_sampling_factor,
                };
                if options.strict_sampling {
                    return Err(violation);
                }
                log::warn!("jpeg: {}", violation);
                warnings.push(Diagnostic::warning(&violation, offset));
            }

            let qtable_id = reader.read_next_byte()?;
            if qtable_id > 3 {
                return Err(Error::InvalidQuantizationTableId(qtable_id));
            }
            component.quantization_table_id = qtable_id;
        }

        let expected = 8 + 3 * u16::from(component_count);
        if length != expected {
            return Err(Error::InvalidFrameHeaderLength {
                declared: length,
                expected,
            });
        }

        Ok(Frame {
            width,
            height,
            component_count,
            components,
            warnings,
        })
    }
}
