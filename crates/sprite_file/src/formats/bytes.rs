//! 16 and 32 bit integer helpers for codecs.
//!
//! The plain functions are little-endian, the `_be` variants big-endian.

use std::io::{Read, Result, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

pub fn read_word<R: Read + ?Sized>(r: &mut R) -> Result<u16> {
    r.read_u16::<LittleEndian>()
}

pub fn read_long<R: Read + ?Sized>(r: &mut R) -> Result<u32> {
    r.read_u32::<LittleEndian>()
}

pub fn write_word<W: Write + ?Sized>(w: &mut W, value: u16) -> Result<()> {
    w.write_u16::<LittleEndian>(value)
}

pub fn write_long<W: Write + ?Sized>(w: &mut W, value: u32) -> Result<()> {
    w.write_u32::<LittleEndian>(value)
}

pub fn read_word_be<R: Read + ?Sized>(r: &mut R) -> Result<u16> {
    r.read_u16::<BigEndian>()
}

pub fn read_long_be<R: Read + ?Sized>(r: &mut R) -> Result<u32> {
    r.read_u32::<BigEndian>()
}

pub fn write_word_be<W: Write + ?Sized>(w: &mut W, value: u16) -> Result<()> {
    w.write_u16::<BigEndian>(value)
}

pub fn write_long_be<W: Write + ?Sized>(w: &mut W, value: u32) -> Result<()> {
    w.write_u32::<BigEndian>(value)
}
