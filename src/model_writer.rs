use std::convert::TryFrom;
use std::io::{self, Seek, SeekFrom, Write};

use cqdb::CQDBWriter;
use log::debug;

use crate::dictionary::Dictionary;
use crate::model::{
    Header, Model, CHUNK_SIZE, TAGMAP_CHUNK, TAGMAP_SIZE, WEIGHTS_CHUNK, WEIGHT_SIZE,
};

/// Serialize a [`Model`] into the binary model format
pub struct ModelWriter;

impl ModelWriter {
    /// Write `model` at the current position of `w`.
    ///
    /// Offsets in the header are relative to that position. Identical models
    /// produce identical bytes.
    pub fn write<W: Write + Seek>(w: &mut W, model: &Model) -> io::Result<()> {
        let base = w.stream_position()?;
        let pos_to_u32 = |pos: u64| -> io::Result<u32> {
            u32::try_from(pos - base).map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, "model size exceeds u32::MAX")
            })
        };

        let weights = model.weights();
        let classes = Dictionary::sorted(model.classes().iter().map(String::as_str));
        let features = Dictionary::sorted(weights.iter().map(|(feature, _, _)| feature));
        let words = Dictionary::sorted(model.tag_dictionary().keys().map(String::as_str));

        let mut header = Header::new();
        header.num_classes = classes.len() as u32;
        header.num_features = features.len() as u32;
        header.num_words = words.len() as u32;
        header.write(w)?;

        // Records are sorted by feature id, then class id
        let mut records = Vec::with_capacity(weights.len());
        for (feature, fid) in features.iter() {
            let mut entries: Vec<(u32, f64)> = weights
                .feature(feature)
                .into_iter()
                .flatten()
                .filter_map(|(class, &weight)| classes.get(class).map(|cid| (cid, weight)))
                .collect();
            entries.sort_by_key(|&(cid, _)| cid);
            records.extend(entries.into_iter().map(|(cid, weight)| (fid, cid, weight)));
        }
        header.off_weights = pos_to_u32(w.stream_position()?)?;
        Self::write_chunk_header(w, WEIGHTS_CHUNK, records.len(), WEIGHT_SIZE)?;
        for (fid, cid, weight) in &records {
            w.write_all(&fid.to_le_bytes())?;
            w.write_all(&cid.to_le_bytes())?;
            w.write_all(&weight.to_le_bytes())?;
        }

        Self::align_to_u32(w)?;
        header.off_classes = pos_to_u32(w.stream_position()?)?;
        Self::write_cqdb(w, &classes)?;

        Self::align_to_u32(w)?;
        header.off_features = pos_to_u32(w.stream_position()?)?;
        Self::write_cqdb(w, &features)?;

        Self::align_to_u32(w)?;
        header.off_words = pos_to_u32(w.stream_position()?)?;
        Self::write_cqdb(w, &words)?;

        Self::align_to_u32(w)?;
        header.off_tagmap = pos_to_u32(w.stream_position()?)?;
        Self::write_chunk_header(w, TAGMAP_CHUNK, words.len(), TAGMAP_SIZE)?;
        for (word, wid) in words.iter() {
            let cid = model
                .lookup(word)
                .and_then(|tag| classes.get(tag))
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("tag of {:?} is not a known class", word),
                    )
                })?;
            w.write_all(&wid.to_le_bytes())?;
            w.write_all(&cid.to_le_bytes())?;
        }

        let end = w.stream_position()?;
        header.size = pos_to_u32(end)?;
        w.seek(SeekFrom::Start(base))?;
        header.write(w)?;
        w.seek(SeekFrom::Start(end))?;

        debug!(
            "wrote model: {} bytes, {} weights, {} classes, {} words",
            header.size,
            records.len(),
            header.num_classes,
            header.num_words
        );
        Ok(())
    }

    fn write_chunk_header<W: Write>(
        w: &mut W,
        magic: &[u8; 4],
        num: usize,
        record_size: usize,
    ) -> io::Result<()> {
        let size = num
            .checked_mul(record_size)
            .and_then(|len| len.checked_add(CHUNK_SIZE))
            .and_then(|size| u32::try_from(size).ok())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "chunk size exceeds u32::MAX")
            })?;
        w.write_all(magic)?;
        w.write_all(&size.to_le_bytes())?;
        w.write_all(&(num as u32).to_le_bytes())?;
        Ok(())
    }

    /// Align the stream position to a 4-byte boundary with zero padding.
    fn align_to_u32<W: Write + Seek>(w: &mut W) -> io::Result<()> {
        let mut pos = w.stream_position()?;
        while pos % 4 != 0 {
            w.write_all(&[0])?;
            pos += 1;
        }
        Ok(())
    }

    /// Write a CQDB dictionary; the database is flushed when the writer drops
    fn write_cqdb<W: Write + Seek>(w: &mut W, dict: &Dictionary) -> io::Result<()> {
        let mut writer = CQDBWriter::new(&mut *w)?;
        for (s, id) in dict.iter() {
            writer.put(s, id)?;
        }
        Ok(())
    }
}
