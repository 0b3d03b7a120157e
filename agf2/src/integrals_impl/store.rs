//! Scratch storage for tensors that do not fit in memory.
//!
//! Each dataset is a flat little-endian `f64` file inside a temporary
//! directory that is removed when the store is dropped.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::PathBuf;
use tempfile::TempDir;
use tracing::debug;

use super::Tensor4;
use crate::error::{Agf2Error, Result};

const F64_BYTES: u64 = 8;

#[derive(Debug)]
struct Dataset {
    path: PathBuf,
    dims: [usize; 4],
}

impl Dataset {
    fn row_stride(&self) -> usize {
        self.dims[1] * self.dims[2] * self.dims[3]
    }
}

#[derive(Debug)]
pub struct TensorStore {
    dir: TempDir,
    datasets: HashMap<String, Dataset>,
}

impl TensorStore {
    pub fn new() -> Result<Self> {
        Ok(TensorStore {
            dir: tempfile::tempdir()?,
            datasets: HashMap::new(),
        })
    }

    /// Allocate a zero-filled dataset, replacing any previous one under `key`.
    pub fn create(&mut self, key: &str, dims: [usize; 4]) -> Result<()> {
        let path = self.dir.path().join(format!("{}.bin", key.replace('/', "_")));
        let file = File::create(&path)?;
        let len: usize = dims.iter().product();
        file.set_len(len as u64 * F64_BYTES)?;
        debug!("Created dataset {} with shape {:?}", key, dims);
        self.datasets.insert(key.to_string(), Dataset { path, dims });
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.datasets.contains_key(key)
    }

    pub fn dims(&self, key: &str) -> Result<[usize; 4]> {
        Ok(self.dataset(key)?.dims)
    }

    fn dataset(&self, key: &str) -> Result<&Dataset> {
        self.datasets
            .get(key)
            .ok_or_else(|| Agf2Error::MissingDataset(key.to_string()))
    }

    /// Write `block` into the leading-axis rows starting at `p0`.
    pub fn write_block(&mut self, key: &str, p0: usize, block: &Tensor4) -> Result<()> {
        let dataset = self.dataset(key)?;
        let bd = block.dims();
        if bd[1..] != dataset.dims[1..] || p0 + bd[0] > dataset.dims[0] {
            return Err(Agf2Error::shape(
                format!("block of {}", key),
                &dataset.dims,
                &bd,
            ));
        }

        let mut file = OpenOptions::new().write(true).open(&dataset.path)?;
        file.seek(SeekFrom::Start((p0 * dataset.row_stride()) as u64 * F64_BYTES))?;
        let mut writer = BufWriter::new(file);
        for &value in block.as_slice() {
            writer.write_f64::<LittleEndian>(value)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read `len` consecutive elements starting at flat offset `offset`.
    pub fn read_range(&self, key: &str, offset: usize, len: usize) -> Result<Vec<f64>> {
        let dataset = self.dataset(key)?;
        let total: usize = dataset.dims.iter().product();
        if offset + len > total {
            return Err(Agf2Error::shape(
                format!("range of {}", key),
                &[total],
                &[offset + len],
            ));
        }

        let mut file = File::open(&dataset.path)?;
        file.seek(SeekFrom::Start(offset as u64 * F64_BYTES))?;
        let mut reader = BufReader::new(file);
        let mut values = vec![0.0; len];
        reader.read_f64_into::<LittleEndian>(&mut values)?;
        Ok(values)
    }

    /// Rows `p0..p1` of the leading axis.
    pub fn read_block(&self, key: &str, p0: usize, p1: usize) -> Result<Tensor4> {
        let dataset = self.dataset(key)?;
        let [n0, n1, n2, n3] = dataset.dims;
        if p0 > p1 || p1 > n0 {
            return Err(Agf2Error::shape(format!("rows of {}", key), &[n0], &[p1]));
        }
        let stride = dataset.row_stride();
        let values = self.read_range(key, p0 * stride, (p1 - p0) * stride)?;
        Tensor4::from_vec([p1 - p0, n1, n2, n3], values)
    }

    pub fn read_all(&self, key: &str) -> Result<Tensor4> {
        let n0 = self.dims(key)?[0];
        self.read_block(key, 0, n0)
    }
}
