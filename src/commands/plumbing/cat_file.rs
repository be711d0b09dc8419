use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatFileMode {
    #[default]
    Pretty,
    Kind,
    Size,
}

impl Repository {
    pub fn cat_file(&self, object_id: &str, mode: CatFileMode) -> anyhow::Result<()> {
        let object_id = ObjectId::try_parse(object_id)
            .map_err(|_| RepositoryError::ObjectNotFound(object_id.to_string()))?;
        match mode {
            CatFileMode::Kind => {
                let raw = self.database().retrieve(&object_id)?;
                writeln!(self.writer(), "{}", raw.kind)?
            }
            CatFileMode::Size => {
                let raw = self.database().retrieve(&object_id)?;
                writeln!(self.writer(), "{}", raw.size)?
            }
            CatFileMode::Pretty => match self.database().parse_object(&object_id)? {
                // blobs are printed byte for byte
                ObjectBox::Blob(blob) => self.writer().write_all(blob.content())?,
                object => writeln!(self.writer(), "{}", object.display())?,
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::repository::fixtures::initialized;
    use crate::artifacts::objects::object_type::ObjectType;
    use assert_fs::TempDir;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(CatFileMode::Pretty, "hello world\n")]
    #[case(CatFileMode::Kind, "blob\n")]
    #[case(CatFileMode::Size, "12\n")]
    fn cat_file_prints_the_requested_view(#[case] mode: CatFileMode, #[case] expected: &str) {
        let dir = TempDir::new().unwrap();
        let (repository, output) = initialized(&dir);
        let oid = repository
            .database()
            .store(Bytes::from_static(b"hello world\n"), ObjectType::Blob)
            .unwrap();

        repository.cat_file(oid.as_ref(), mode).unwrap();

        assert_eq!(output.take(), expected);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let dir = TempDir::new().unwrap();
        let (repository, _) = initialized(&dir);

        let error = repository.cat_file("not-an-id", CatFileMode::Pretty).unwrap_err();

        assert!(matches!(
            error.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::ObjectNotFound(_))
        ));
    }
}
