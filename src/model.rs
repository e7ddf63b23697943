use std::{
    collections::{BTreeSet, HashMap},
    fs::{self, File},
    io::{self, BufWriter, Cursor, Write},
    path::Path,
};

use bstr::ByteSlice;
use cqdb::CQDB;

use crate::errors::{Result, TaggerError};
use crate::feature::FeatureSet;
use crate::model_writer::ModelWriter;
use crate::weights::Weights;

pub(crate) const MAGIC: &[u8; 4] = b"lPOS";
pub(crate) const MODEL_TYPE: &[u8; 4] = b"AVPT";
pub(crate) const VERSION: u32 = 100;
pub(crate) const HEADER_SIZE: usize = 48;
pub(crate) const CHUNK_SIZE: usize = 12;
pub(crate) const WEIGHT_SIZE: usize = 16;
pub(crate) const TAGMAP_SIZE: usize = 8;
pub(crate) const WEIGHTS_CHUNK: &[u8; 4] = b"WGHT";
pub(crate) const TAGMAP_CHUNK: &[u8; 4] = b"TMAP";

const CQDB_MAGIC: &[u8; 4] = b"CQDB";
const CQDB_BYTEORDER: u32 = 0x6244_5371;
const CQDB_TABLES: u64 = 256;
// magic, size, flag, byte order, backlink size and offset, then the table refs
const CQDB_HEADER_SIZE: u64 = 24 + CQDB_TABLES * 8;

#[inline]
pub(crate) fn unpack_u32(buf: &[u8]) -> io::Result<u32> {
    if buf.len() < 4 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "not enough data for unpacking u32",
        ));
    }
    Ok(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

#[inline]
fn unpack_f64(buf: &[u8]) -> io::Result<f64> {
    if buf.len() < 8 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "not enough data for unpacking f64",
        ));
    }
    Ok(f64::from_le_bytes([
        buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
    ]))
}

fn corrupt(err: io::Error) -> TaggerError {
    TaggerError::invalid_model(err.to_string())
}

/// File header of a persisted model
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Header {
    pub magic: [u8; 4],
    pub size: u32,
    pub r#type: [u8; 4],
    pub version: u32,
    pub num_features: u32,
    pub num_classes: u32,
    pub num_words: u32,
    pub off_weights: u32,
    pub off_classes: u32,
    pub off_features: u32,
    pub off_words: u32,
    pub off_tagmap: u32,
}

impl Header {
    pub(crate) fn new() -> Self {
        Self {
            magic: *MAGIC,
            r#type: *MODEL_TYPE,
            version: VERSION,
            ..Self::default()
        }
    }

    fn read(buf: &[u8]) -> io::Result<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "not enough data for the file header",
            ));
        }
        let field = |i: usize| unpack_u32(&buf[4 * i..]);
        Ok(Self {
            magic: [buf[0], buf[1], buf[2], buf[3]],
            size: field(1)?,
            r#type: [buf[8], buf[9], buf[10], buf[11]],
            version: field(3)?,
            num_features: field(4)?,
            num_classes: field(5)?,
            num_words: field(6)?,
            off_weights: field(7)?,
            off_classes: field(8)?,
            off_features: field(9)?,
            off_words: field(10)?,
            off_tagmap: field(11)?,
        })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.magic)?;
        w.write_all(&self.size.to_le_bytes())?;
        w.write_all(&self.r#type)?;
        for value in [
            self.version,
            self.num_features,
            self.num_classes,
            self.num_words,
            self.off_weights,
            self.off_classes,
            self.off_features,
            self.off_words,
            self.off_tagmap,
        ]
        .iter()
        {
            w.write_all(&value.to_le_bytes())?;
        }
        Ok(())
    }
}

/// A trained tagging model: averaged weights, tag dictionary and known classes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    weights: Weights,
    tagdict: HashMap<String, String>,
    classes: BTreeSet<String>,
}

impl Model {
    /// Assemble a model, checking that every weight and dictionary entry
    /// refers to a known class
    pub fn new(
        weights: Weights,
        tagdict: HashMap<String, String>,
        classes: BTreeSet<String>,
    ) -> Result<Self> {
        if let Some((feature, class, _)) = weights.iter().find(|(_, c, _)| !classes.contains(*c)) {
            return Err(TaggerError::invalid_model(format!(
                "weight of feature {:?} refers to unknown class {:?}",
                feature, class
            )));
        }
        if let Some((word, tag)) = tagdict.iter().find(|(_, t)| !classes.contains(*t)) {
            return Err(TaggerError::invalid_model(format!(
                "tag dictionary maps {:?} to unknown class {:?}",
                word, tag
            )));
        }
        Ok(Self {
            weights,
            tagdict,
            classes,
        })
    }

    /// Load a model from a file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let buf = fs::read(path)?;
        Self::from_bytes(&buf)
    }

    /// Load a model from memory
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        let header = Header::read(buf).map_err(corrupt)?;
        if &header.magic != MAGIC {
            return Err(TaggerError::invalid_model("invalid file format, magic mismatch"));
        }
        if &header.r#type != MODEL_TYPE {
            return Err(TaggerError::invalid_model("unsupported model type"));
        }
        if header.version != VERSION {
            return Err(TaggerError::invalid_model(format!(
                "unsupported model version {}",
                header.version
            )));
        }
        if header.size as usize != buf.len() {
            return Err(TaggerError::invalid_model(format!(
                "model size mismatch, header says {} bytes but got {}",
                header.size,
                buf.len()
            )));
        }

        let class_names = read_strings(buf, header.off_classes, header.num_classes, "classes")?;
        let feature_names = read_strings(buf, header.off_features, header.num_features, "features")?;
        let words = read_strings(buf, header.off_words, header.num_words, "words")?;
        let class = |id: u32| {
            class_names
                .get(id as usize)
                .ok_or_else(|| TaggerError::invalid_model(format!("unknown class id {}", id)))
        };

        let mut weights = Weights::new();
        let records = read_chunk(buf, header.off_weights, WEIGHTS_CHUNK, WEIGHT_SIZE)?;
        for record in records.chunks_exact(WEIGHT_SIZE) {
            let fid = unpack_u32(record).map_err(corrupt)?;
            let cid = unpack_u32(&record[4..]).map_err(corrupt)?;
            let weight = unpack_f64(&record[8..]).map_err(corrupt)?;
            let feature = feature_names
                .get(fid as usize)
                .ok_or_else(|| TaggerError::invalid_model(format!("unknown feature id {}", fid)))?;
            if !weight.is_finite() {
                return Err(TaggerError::invalid_model(format!(
                    "weight of feature {:?} is not finite",
                    feature
                )));
            }
            weights.set(feature, class(cid)?, weight);
        }

        let mut tagdict = HashMap::with_capacity(words.len());
        let records = read_chunk(buf, header.off_tagmap, TAGMAP_CHUNK, TAGMAP_SIZE)?;
        for record in records.chunks_exact(TAGMAP_SIZE) {
            let wid = unpack_u32(record).map_err(corrupt)?;
            let cid = unpack_u32(&record[4..]).map_err(corrupt)?;
            let word = words
                .get(wid as usize)
                .ok_or_else(|| TaggerError::invalid_model(format!("unknown word id {}", wid)))?;
            tagdict.insert(word.clone(), class(cid)?.clone());
        }

        Self::new(weights, tagdict, class_names.into_iter().collect())
    }

    /// Write the model to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path)?);
        ModelWriter::write(&mut file, self)?;
        file.flush()?;
        Ok(())
    }

    /// Serialize the model into memory
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        ModelWriter::write(&mut buf, self)?;
        Ok(buf.into_inner())
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Words with a forced tag
    pub fn tag_dictionary(&self) -> &HashMap<String, String> {
        &self.tagdict
    }

    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }

    /// Forced tag of `word`, if it is unambiguous
    pub fn lookup(&self, word: &str) -> Option<&str> {
        self.tagdict.get(word).map(String::as_str)
    }

    /// Best class for a feature set, `None` when the model knows no classes
    pub fn predict(&self, features: &FeatureSet) -> Option<&str> {
        self.weights.predict(features, &self.classes)
    }

    /// Print the model in human-readable format
    pub fn dump<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "CLASSES = {{")?;
        for (i, class) in self.classes.iter().enumerate() {
            writeln!(w, "  {:>5}: {}", i, class)?;
        }
        writeln!(w, "}}\n")?;

        writeln!(w, "TAG_DICTIONARY = {{")?;
        let mut words: Vec<_> = self.tagdict.iter().collect();
        words.sort();
        for (word, tag) in words {
            writeln!(w, "  {} --> {}", word, tag)?;
        }
        writeln!(w, "}}\n")?;

        writeln!(w, "WEIGHTS = {{")?;
        let mut entries: Vec<_> = self.weights.iter().collect();
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        for (feature, class, weight) in entries {
            writeln!(w, "  {} --> {}: {:.6}", feature, class, weight)?;
        }
        writeln!(w, "}}\n")?;
        Ok(())
    }
}

/// Read `num` strings numbered `0..num` from the CQDB at `offset`
fn read_strings(buf: &[u8], offset: u32, num: u32, name: &str) -> Result<Vec<String>> {
    let start = offset as usize;
    if start < HEADER_SIZE || start >= buf.len() {
        return Err(TaggerError::invalid_model(format!("missing {} dictionary", name)));
    }
    let chunk = cqdb_chunk(&buf[start..], num, name)?;
    let db = CQDB::new(chunk)
        .map_err(|e| TaggerError::invalid_model(format!("{} dictionary: {}", name, e)))?;
    (0..num)
        .map(|id| {
            db.to_str(id)
                .and_then(|s| s.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    TaggerError::invalid_model(format!("{} dictionary has no entry #{}", name, id))
                })
        })
        .collect()
}

/// Check the CQDB at the start of `buf` so that its header, hash tables and
/// the entries `0..num` all lie inside its own chunk, and return that chunk.
fn cqdb_chunk<'a>(buf: &'a [u8], num: u32, name: &str) -> Result<&'a [u8]> {
    let invalid = |what: String| TaggerError::invalid_model(format!("{} dictionary {}", name, what));
    if (buf.len() as u64) < CQDB_HEADER_SIZE {
        return Err(invalid("is truncated".to_string()));
    }
    if &buf[..4] != CQDB_MAGIC {
        return Err(invalid("has no CQDB magic".to_string()));
    }
    // positions passed here are checked against the chunk size first
    let field = |pos: u64| {
        unpack_u32(&buf[pos as usize..])
            .map(u64::from)
            .map_err(corrupt)
    };
    let size = field(4)?;
    if size < CQDB_HEADER_SIZE || size > buf.len() as u64 {
        return Err(invalid(format!("has invalid size {}", size)));
    }
    if field(12)? != u64::from(CQDB_BYTEORDER) {
        return Err(invalid("has a byte order mismatch".to_string()));
    }
    let bwd_size = field(16)?;
    let bwd_offset = field(20)?;

    let mut num_db = 0;
    for i in 0..CQDB_TABLES {
        let offset = field(24 + 8 * i)?;
        let len = field(28 + 8 * i)?;
        if offset > 0 && offset + 8 * len > size {
            return Err(invalid(format!("hash table #{} is out of range", i)));
        }
        num_db += len / 2;
    }
    if 4 * num_db > size || (bwd_offset > 0 && bwd_offset + 4 * num_db > size) {
        return Err(invalid("backlinks are out of range".to_string()));
    }

    for id in 0..u64::from(num) {
        if bwd_offset == 0 || id >= bwd_size || id >= num_db {
            return Err(invalid(format!("has no entry #{}", id)));
        }
        let entry = field(bwd_offset + 4 * id)?;
        if entry == 0 {
            return Err(invalid(format!("has no entry #{}", id)));
        }
        // id, key size including the trailing NUL, key bytes
        if entry + 8 > size {
            return Err(invalid(format!("entry #{} is out of range", id)));
        }
        let key_size = field(entry + 4)?;
        if key_size == 0 || entry + 8 + key_size > size {
            return Err(invalid(format!("entry #{} is out of range", id)));
        }
    }
    Ok(&buf[..size as usize])
}

/// Read the records of the chunk at `offset`
fn read_chunk<'a>(
    buf: &'a [u8],
    offset: u32,
    magic: &[u8; 4],
    record_size: usize,
) -> Result<&'a [u8]> {
    let name = String::from_utf8_lossy(magic);
    let start = offset as usize;
    let chunk = match buf.get(start..start + CHUNK_SIZE) {
        Some(chunk) if start >= HEADER_SIZE => chunk,
        _ => return Err(TaggerError::invalid_model(format!("missing {} chunk", name))),
    };
    if &chunk[..4] != magic {
        return Err(TaggerError::invalid_model(format!(
            "expected {} chunk, found {:?}",
            name,
            String::from_utf8_lossy(&chunk[..4])
        )));
    }
    let size = unpack_u32(&chunk[4..]).map_err(corrupt)? as usize;
    let num = unpack_u32(&chunk[8..]).map_err(corrupt)? as usize;
    let body = num
        .checked_mul(record_size)
        .filter(|len| size == CHUNK_SIZE + len)
        .and_then(|len| buf.get(start + CHUNK_SIZE..start + CHUNK_SIZE + len));
    body.ok_or_else(|| TaggerError::invalid_model(format!("{} chunk is truncated", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Model {
        let mut weights = Weights::new();
        weights.set("bias", "NN", 0.25);
        weights.set("bias", "VB", -0.125);
        weights.set("i word run", "VB", 1.5);
        let mut tagdict = HashMap::new();
        tagdict.insert("the".to_string(), "DT".to_string());
        let classes = ["DT", "NN", "VB"].iter().map(|s| s.to_string()).collect();
        Model::new(weights, tagdict, classes).unwrap()
    }

    #[test]
    fn test_model_roundtrip() {
        let model = sample();
        let buf = model.to_bytes().unwrap();
        assert_eq!(&buf[..4], MAGIC);
        let loaded = Model::from_bytes(&buf).unwrap();
        assert_eq!(loaded, model);
        assert_eq!(loaded.lookup("the"), Some("DT"));
        assert_eq!(loaded.weights().get("i word run", "VB"), 1.5);
    }

    #[test]
    fn test_model_bytes_deterministic() {
        let model = sample();
        assert_eq!(model.to_bytes().unwrap(), model.clone().to_bytes().unwrap());
    }

    #[test]
    fn test_empty_model_roundtrip() {
        let model = Model::default();
        let loaded = Model::from_bytes(&model.to_bytes().unwrap()).unwrap();
        assert_eq!(loaded, model);
        assert!(loaded.predict(&FeatureSet::new()).is_none());
    }

    #[test]
    fn test_new_rejects_unknown_class() {
        let mut weights = Weights::new();
        weights.set("bias", "XX", 1.0);
        let classes = ["NN"].iter().map(|s| s.to_string()).collect();
        let err = Model::new(weights, HashMap::new(), classes).unwrap_err();
        assert!(matches!(err, TaggerError::InvalidModel(_)));
    }

    #[test]
    fn test_invalid_model() {
        assert!(matches!(
            Model::from_bytes(b""),
            Err(TaggerError::InvalidModel(_))
        ));

        let mut buf = sample().to_bytes().unwrap();
        buf[0] = b'L';
        assert!(matches!(
            Model::from_bytes(&buf),
            Err(TaggerError::InvalidModel(_))
        ));

        let buf = sample().to_bytes().unwrap();
        assert!(matches!(
            Model::from_bytes(&buf[..buf.len() - 1]),
            Err(TaggerError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_wrong_chunk_type() {
        let mut buf = sample().to_bytes().unwrap();
        let header = Header::read(&buf).unwrap();
        // point the weights offset at the tag map chunk
        buf[28..32].copy_from_slice(&header.off_tagmap.to_le_bytes());
        let err = Model::from_bytes(&buf).unwrap_err();
        assert!(err.to_string().contains("expected WGHT chunk"));

        let mut buf = sample().to_bytes().unwrap();
        buf[44..48].copy_from_slice(&0u32.to_le_bytes());
        let err = Model::from_bytes(&buf).unwrap_err();
        assert!(err.to_string().contains("missing TMAP chunk"));
    }

    #[test]
    fn test_corrupted_dictionary_header() {
        let buf = sample().to_bytes().unwrap();
        let off_classes = Header::read(&buf).unwrap().off_classes as usize;

        let mut bad = buf.clone();
        bad[off_classes + 4..off_classes + 8].copy_from_slice(&u32::MAX.to_le_bytes());
        let err = Model::from_bytes(&bad).unwrap_err();
        assert!(err.to_string().contains("classes dictionary has invalid size"), "{}", err);

        // first hash table claims far more buckets than the chunk holds
        let mut bad = buf.clone();
        bad[off_classes + 24..off_classes + 28].copy_from_slice(&1u32.to_le_bytes());
        bad[off_classes + 28..off_classes + 32].copy_from_slice(&u32::MAX.to_le_bytes());
        let err = Model::from_bytes(&bad).unwrap_err();
        assert!(err.to_string().contains("hash table #0 is out of range"), "{}", err);

        // backlink of class #0 points past the end of the chunk
        let mut bad = buf.clone();
        let bwd_offset = off_classes + unpack_u32(&buf[off_classes + 20..]).unwrap() as usize;
        bad[bwd_offset..bwd_offset + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        let err = Model::from_bytes(&bad).unwrap_err();
        assert!(err.to_string().contains("entry #0 is out of range"), "{}", err);

        // key size of class #0 is zero
        let mut bad = buf.clone();
        let entry = off_classes + unpack_u32(&buf[bwd_offset..]).unwrap() as usize;
        bad[entry + 4..entry + 8].copy_from_slice(&0u32.to_le_bytes());
        let err = Model::from_bytes(&bad).unwrap_err();
        assert!(err.to_string().contains("entry #0 is out of range"), "{}", err);
    }

    #[test]
    fn test_model_dump() {
        let mut out = Vec::new();
        sample().dump(&mut out).unwrap();
        let out_str = std::str::from_utf8(&out).unwrap();
        let expected = r#"CLASSES = {
      0: DT
      1: NN
      2: VB
}

TAG_DICTIONARY = {
  the --> DT
}

WEIGHTS = {
  bias --> NN: 0.250000
  bias --> VB: -0.125000
  i word run --> VB: 1.500000
}

"#;
        assert_eq!(out_str, expected);
    }
}
