/// Read / write sequences of event records with `bincode`

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Error, Result};

pub fn write<T: Serialize>(records: &[T], path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut file, records)?;
    Ok(())
}

pub fn read<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::SourceUnavailable(path.display().to_string()),
        _                   => Error::Io(e),
    })?;
    let records: Vec<T> = bincode::deserialize_from(BufReader::new(file))?;
    log::debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::{RawEvent, test_data::{jet, particle}};
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn raw_events_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("events.bin");
        let events = vec![
            RawEvent::new(vec![jet(300.0, 1.0, 0.5, 80.0, vec![Some(particle(10.0, 1.1, 0.4)), None])]),
            RawEvent::unavailable(),
            RawEvent::new(vec![]),
        ];
        write(&events, &path)?;
        let reloaded: Vec<RawEvent> = read(&path)?;
        assert_eq!(events, reloaded);
        Ok(())
    }

    #[test]
    fn missing_file_is_unavailable_source() {
        let result = read::<RawEvent>(Path::new("/no/such/events.bin"));
        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
    }

    #[test]
    fn garbage_is_a_decode_error() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("garbage.bin");
        std::fs::write(&path, [0xff; 3])?;
        assert!(matches!(read::<RawEvent>(&path), Err(Error::Decode(_))));
        Ok(())
    }
}
