//! pkt-line framing: each line is prefixed with its own length (data + 4)
//! as four lowercase hex digits; `0000` is a flush packet.

use crate::errors::RitError;
use std::io::{Read, Write};

/// One unit read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Line(Vec<u8>),
    Flush,
}

pub fn write_pkt_line(writer: &mut impl Write, data: &[u8]) -> anyhow::Result<()> {
    let len = data.len() + 4;
    if len > 0xFFFF {
        return Err(RitError::Protocol("pkt-line payload too long".to_string()).into());
    }
    write!(writer, "{len:04x}")?;
    writer.write_all(data)?;
    Ok(())
}

pub fn write_flush(writer: &mut impl Write) -> anyhow::Result<()> {
    writer.write_all(b"0000")?;
    Ok(())
}

/// Read one packet; `None` at a clean end of stream.
pub fn read_packet(reader: &mut impl Read) -> anyhow::Result<Option<Packet>> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(RitError::Protocol(format!("reading pkt-line length: {err}")).into()),
    }

    let len_str = std::str::from_utf8(&len_buf)
        .map_err(|_| RitError::Protocol("pkt-line length is not hex".to_string()))?;
    let len = u16::from_str_radix(len_str, 16)
        .map_err(|_| RitError::Protocol(format!("bad pkt-line length '{len_str}'")))? as usize;

    // 0000 = flush, 0001 = delimiter; both end a section
    if len <= 1 {
        return Ok(Some(Packet::Flush));
    }
    if len < 4 {
        return Err(RitError::Protocol(format!("bad pkt-line length {len}")).into());
    }

    let mut data = vec![0u8; len - 4];
    reader
        .read_exact(&mut data)
        .map_err(|err| RitError::Protocol(format!("reading pkt-line data: {err}")))?;
    Ok(Some(Packet::Line(data)))
}

/// All lines up to (and consuming) the next flush packet.
pub fn read_until_flush(reader: &mut impl Read) -> anyhow::Result<Vec<Vec<u8>>> {
    let mut lines = Vec::new();
    loop {
        match read_packet(reader)? {
            Some(Packet::Line(line)) => lines.push(line),
            Some(Packet::Flush) | None => return Ok(lines),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn line_round_trips() {
        let mut buffer = Vec::new();
        write_pkt_line(&mut buffer, b"hello\n").unwrap();
        write_flush(&mut buffer).unwrap();

        assert_eq!(&buffer[..4], b"000a");

        let mut cursor = std::io::Cursor::new(buffer);
        assert_eq!(
            read_packet(&mut cursor).unwrap(),
            Some(Packet::Line(b"hello\n".to_vec()))
        );
        assert_eq!(read_packet(&mut cursor).unwrap(), Some(Packet::Flush));
        assert_eq!(read_packet(&mut cursor).unwrap(), None);
    }

    #[test]
    fn read_until_flush_collects_a_section() {
        let mut buffer = Vec::new();
        write_pkt_line(&mut buffer, b"one").unwrap();
        write_pkt_line(&mut buffer, b"two").unwrap();
        write_flush(&mut buffer).unwrap();
        write_pkt_line(&mut buffer, b"after").unwrap();

        let mut cursor = std::io::Cursor::new(buffer);
        let section = read_until_flush(&mut cursor).unwrap();
        assert_eq!(section, vec![b"one".to_vec(), b"two".to_vec()]);

        // the cursor is positioned after the flush
        assert_eq!(
            read_packet(&mut cursor).unwrap(),
            Some(Packet::Line(b"after".to_vec()))
        );
    }

    #[test]
    fn garbage_length_is_a_protocol_error() {
        let mut cursor = std::io::Cursor::new(b"zzzz".to_vec());
        assert!(read_packet(&mut cursor).is_err());
    }
}
