use std::{
    fs::OpenOptions,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use byte_writer::ByteWriter;

use crate::{
    error::SprError, Palette, Spr, SprFormat, SprFrame, SprGroup, SprHeader, SprImage,
    FRAME_GROUP, FRAME_SINGLE, SPR_MAGIC,
};

/// Global offset of the sprite, added to every image.
#[derive(Clone, Copy)]
struct Origin {
    x: i32,
    y: i32,
}

trait WriteToWriter {
    fn write_to_bytes(&self, writer: &mut ByteWriter, origin: Origin);
}

impl Spr {
    pub fn write_to_file(&self, path: impl AsRef<Path> + Into<PathBuf>) -> Result<(), SprError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|op| SprError::IOError { source: op })?;

        self.write_to(BufWriter::new(file))
    }

    /// Serializes and writes the whole sprite. Any short write fails the whole thing.
    pub fn write_to(&self, out: impl Write) -> Result<(), SprError> {
        self.to_byte_writer()
            .write_all_to(out)
            .map_err(|op| SprError::IOError { source: op })
    }

    pub fn write_to_bytes(&self) -> Vec<u8> {
        self.to_byte_writer().data
    }

    fn to_byte_writer(&self) -> ByteWriter {
        let mut writer = ByteWriter::new();

        let Self {
            header,
            palette,
            offset_x,
            offset_y,
            frames,
        } = self;

        let origin = Origin {
            x: *offset_x,
            y: *offset_y,
        };

        header.write_header(&mut writer, frames.len() as i32);

        if let SprFormat::HalfLife { .. } = header.format {
            palette.write_to_bytes(&mut writer, origin);
        }

        frames
            .iter()
            .for_each(|frame| frame.write_to_bytes(&mut writer, origin));

        writer
    }
}

impl SprHeader {
    fn write_header(&self, writer: &mut ByteWriter, frame_num: i32) {
        let Self {
            format,
            alignment,
            bounding_radius,
            max_width,
            max_height,
            beam_length,
            sync_type,
        } = self;

        writer.append_u8_slice(SPR_MAGIC);
        writer.append_i32(format.version());
        writer.append_i32(*alignment as i32);

        if let Some(texture_format) = format.texture_format() {
            writer.append_i32(texture_format as i32);
        }

        writer.append_f32(*bounding_radius);
        writer.append_i32(*max_width);
        writer.append_i32(*max_height);
        writer.append_i32(frame_num);
        writer.append_f32(*beam_length);
        writer.append_i32(*sync_type as i32);
    }
}

impl WriteToWriter for Palette {
    fn write_to_bytes(&self, writer: &mut ByteWriter, _: Origin) {
        writer.append_u16(self.len() as u16);
        writer.append_u8_slice(self.get_bytes().as_flattened());
    }
}

impl WriteToWriter for SprImage {
    fn write_to_bytes(&self, writer: &mut ByteWriter, origin: Origin) {
        let Self {
            offset_x,
            offset_y,
            width,
            height,
            raster,
        } = self;

        writer.append_i32(offset_x + origin.x);
        writer.append_i32(offset_y + origin.y);
        writer.append_i32(*width);
        writer.append_i32(*height);
        writer.append_u8_slice(raster);
    }
}

impl WriteToWriter for SprGroup {
    fn write_to_bytes(&self, writer: &mut ByteWriter, origin: Origin) {
        let Self { keys, images } = self;

        writer.append_i32(images.len() as i32);
        writer.append_f32_slice(keys);
        images
            .iter()
            .for_each(|image| image.write_to_bytes(writer, origin));
    }
}

impl WriteToWriter for SprFrame {
    fn write_to_bytes(&self, writer: &mut ByteWriter, origin: Origin) {
        match self {
            SprFrame::Single(image) => {
                writer.append_i32(FRAME_SINGLE);
                image.write_to_bytes(writer, origin);
            }
            SprFrame::Group(group) => {
                writer.append_i32(FRAME_GROUP);
                group.write_to_bytes(writer, origin);
            }
        }
    }
}
