use nom::{
    bytes::complete::{tag, take},
    combinator::map,
    error::{Error, ErrorKind},
    multi::count,
    number::complete::{le_f32, le_i32, le_u16},
    IResult as _IResult, Parser,
};

use crate::{
    Alignment, Palette, Spr, SprFormat, SprFrame, SprFrames, SprGroup, SprHeader, SprImage,
    SyncType, TextureFormat, FRAME_GROUP, FRAME_SINGLE, SPR_MAGIC,
};

pub type IResult<'a, T> = _IResult<&'a [u8], T>;

fn fail<T>(i: &[u8], kind: ErrorKind) -> IResult<'_, T> {
    Err(nom::Err::Error(Error::new(i, kind)))
}

fn wire_enum<T: TryFrom<i32>>(i: &[u8]) -> IResult<'_, T> {
    let (rest, value) = le_i32(i)?;

    match T::try_from(value) {
        Ok(res) => Ok((rest, res)),
        Err(_) => fail(i, ErrorKind::Verify),
    }
}

fn non_negative(i: &[u8]) -> IResult<'_, usize> {
    let (rest, value) = le_i32(i)?;

    if value < 0 {
        return fail(i, ErrorKind::Verify);
    }

    Ok((rest, value as usize))
}

/// Returns the header with the frame count that follows it.
pub fn parse_header(i: &'_ [u8]) -> IResult<'_, (SprHeader, usize)> {
    let (i, _) = tag(SPR_MAGIC.as_slice()).parse(i)?;
    let (i, version) = le_i32(i)?;
    let (i, alignment) = wire_enum::<Alignment>(i)?;

    let (i, format) = match version {
        1 => (i, SprFormat::Quake),
        2 => map(wire_enum::<TextureFormat>, |texture_format| {
            SprFormat::HalfLife { texture_format }
        })
        .parse(i)?,
        _ => return fail(i, ErrorKind::Tag),
    };

    let (i, (bounding_radius, max_width, max_height, frame_num, beam_length, sync_type)) = (
        le_f32,
        le_i32,
        le_i32,
        non_negative,
        le_f32,
        wire_enum::<SyncType>,
    )
        .parse(i)?;

    Ok((
        i,
        (
            SprHeader {
                format,
                alignment,
                bounding_radius,
                max_width,
                max_height,
                beam_length,
                sync_type,
            },
            frame_num,
        ),
    ))
}

pub fn parse_palette(i: &'_ [u8]) -> IResult<'_, Palette> {
    let (i, palette_count) = le_u16(i)?;

    map(
        count(
            map(take(3usize), |arr: &[u8]| [arr[0], arr[1], arr[2]]),
            palette_count as usize,
        ),
        Palette::new,
    )
    .parse(i)
}

pub fn parse_image(i: &'_ [u8]) -> IResult<'_, SprImage> {
    let (i, (offset_x, offset_y, width, height)) = (le_i32, le_i32, le_i32, le_i32).parse(i)?;

    if width < 0 || height < 0 {
        return fail(i, ErrorKind::Verify);
    }

    let (i, raster) = take(width as usize * height as usize).parse(i)?;

    Ok((
        i,
        SprImage {
            offset_x,
            offset_y,
            width,
            height,
            raster: raster.to_vec(),
        },
    ))
}

pub fn parse_group(i: &'_ [u8]) -> IResult<'_, SprGroup> {
    let (i, image_count) = non_negative(i)?;
    let (i, keys) = count(le_f32, image_count).parse(i)?;
    let (i, images) = count(parse_image, image_count).parse(i)?;

    Ok((i, SprGroup { keys, images }))
}

pub fn parse_frame(i: &'_ [u8]) -> IResult<'_, SprFrame> {
    let (rest, frame_type) = le_i32(i)?;

    match frame_type {
        FRAME_SINGLE => map(parse_image, SprFrame::Single).parse(rest),
        FRAME_GROUP => map(parse_group, SprFrame::Group).parse(rest),
        _ => fail(i, ErrorKind::Switch),
    }
}

pub fn parse_frames(i: &'_ [u8], frame_count: usize) -> IResult<'_, SprFrames> {
    count(parse_frame, frame_count).parse(i)
}

pub fn parse_spr(i: &'_ [u8]) -> IResult<'_, Spr> {
    let (i, (header, frame_num)) = parse_header.parse(i)?;

    let (i, palette) = match header.format {
        SprFormat::Quake => (i, Palette::quake()),
        SprFormat::HalfLife { .. } => parse_palette(i)?,
    };

    let (i, frames) = parse_frames(i, frame_num)?;

    Ok((
        i,
        Spr {
            header,
            palette,
            offset_x: 0,
            offset_y: 0,
            frames,
        },
    ))
}
