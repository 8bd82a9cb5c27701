//! The spreadsheet session: bind a file, store records, load them back.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use ezspreadsheet_common::CellValue;
use ezspreadsheet_store::{
    RowIter, RowStyle, TabularFormat, TabularWriter, create_writer, open_reader, resolve_path,
};

use crate::codec::{ValueCodec, decode_cells, encode_record, header_row};
use crate::config::SpreadsheetConfig;
use crate::error::{Error, Result, SchemaError};
use crate::generic::GenericRecord;
use crate::record::{Record, RecordType, Storable};
use crate::retry::{LockHandler, RetryDecision, abort_on_lock};

/// Options for a single [`Spreadsheet::store`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Write containers as bulleted text for people to read. Lossy: such
    /// cells load back as plain text.
    pub readable: bool,
}

impl StoreOptions {
    pub fn readable() -> Self {
        Self { readable: true }
    }
}

/// One file, one optional record type, one backend.
///
/// Opening a session selects the backend; its writer is acquired by the
/// first [`store`](Self::store), so load-only sessions never need write
/// access. [`close`](Self::close) saves what was stored; dropping the
/// session (or [`abandon`](Self::abandon)) releases it without saving.
///
/// ```no_run
/// use ezspreadsheet::{Record, Spreadsheet, StoreOptions};
///
/// #[derive(Record)]
/// struct Animal {
///     name: String,
///     conservation_status: String,
/// }
///
/// let gecko = Animal { name: "Leopard Gecko".into(), conservation_status: "Least Concern".into() };
/// let eagle = Animal { name: "Philippine Eagle".into(), conservation_status: "Threatened".into() };
///
/// let mut sheet = Spreadsheet::<Animal>::bind("animals.xlsx")?;
/// sheet.store([&gecko, &eagle], StoreOptions::default())?;
/// sheet.close()?;
///
/// let sheet = Spreadsheet::open("animals.xlsx")?;
/// let (animal, instances) = sheet.load("Animal")?;
/// println!("{animal}: {}", instances[0]);
/// # Ok::<(), ezspreadsheet::Error>(())
/// ```
pub struct Spreadsheet<R: Record = GenericRecord> {
    path: PathBuf,
    format: TabularFormat,
    record_type: Option<RecordType>,
    config: SpreadsheetConfig,
    writer: Option<Box<dyn TabularWriter>>,
    header_written: bool,
    stored: usize,
    on_locked: LockHandler,
    _record: PhantomData<fn() -> R>,
}

impl Spreadsheet<GenericRecord> {
    /// Session with no bound type, for loading into generic records.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, SpreadsheetConfig::default())
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: SpreadsheetConfig) -> Result<Self> {
        Self::enter(path.as_ref(), None, config)
    }

    /// Session bound to a record type declared at runtime.
    pub fn with_record_type(path: impl AsRef<Path>, record_type: RecordType) -> Result<Self> {
        Self::with_record_type_and_config(path, record_type, SpreadsheetConfig::default())
    }

    pub fn with_record_type_and_config(
        path: impl AsRef<Path>,
        record_type: RecordType,
        config: SpreadsheetConfig,
    ) -> Result<Self> {
        Self::enter(path.as_ref(), Some(record_type), config)
    }
}

impl<R: Record> Spreadsheet<R> {
    /// Session bound to the declared record type `R`.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::bind_with_config(path, SpreadsheetConfig::default())
    }

    pub fn bind_with_config(path: impl AsRef<Path>, config: SpreadsheetConfig) -> Result<Self> {
        let record_type = RecordType::of::<R>()?;
        Self::enter(path.as_ref(), Some(record_type), config)
    }

    fn enter(path: &Path, record_type: Option<RecordType>, config: SpreadsheetConfig) -> Result<Self> {
        let (path, format) = resolve_path(path)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            path = %path.display(),
            %format,
            record_type = ?record_type.as_ref().map(RecordType::name),
            "spreadsheet opened"
        );
        Ok(Self::from_parts(path, format, record_type, config, None))
    }

    fn from_parts(
        path: PathBuf,
        format: TabularFormat,
        record_type: Option<RecordType>,
        config: SpreadsheetConfig,
        writer: Option<Box<dyn TabularWriter>>,
    ) -> Self {
        Self {
            path,
            format,
            record_type,
            config,
            writer,
            header_written: false,
            stored: 0,
            on_locked: Box::new(abort_on_lock),
            _record: PhantomData,
        }
    }

    /// Decide what happens when the file is locked at save time.
    ///
    /// The default gives up with [`Error::ResourceLocked`];
    /// [`retry::prompt_on_terminal`](crate::retry::prompt_on_terminal) asks the user.
    pub fn on_locked(mut self, handler: impl FnMut(&Path) -> RetryDecision + 'static) -> Self {
        self.on_locked = Box::new(handler);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> TabularFormat {
        self.format
    }

    pub fn record_type(&self) -> Option<&RecordType> {
        self.record_type.as_ref()
    }

    /// Instances written by this session so far.
    pub fn stored(&self) -> usize {
        self.stored
    }

    /// Write instances as rows, expanding collection arguments element-wise.
    ///
    /// The header goes out with the first call; later calls append below it.
    /// The first instance of the wrong type aborts the call; rows already
    /// written stay written. Returns the number of rows added.
    pub fn store<'a, I>(&mut self, items: I, options: StoreOptions) -> Result<usize>
    where
        I: IntoIterator,
        I::Item: Into<Storable<'a>>,
    {
        let ty = self.record_type.as_ref().ok_or(Error::Unbound)?;
        // The backend writer is only acquired once there is something to write.
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => create_writer(&self.path, self.format, &self.config.backend)?,
        };
        let writer = self.writer.insert(writer);
        let codec = ValueCodec::for_format(self.format, options.readable);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            record_type = ty.name(),
            path = %self.path.display(),
            readable = options.readable,
            "storing instances"
        );

        if !self.header_written {
            writer.write_row(&header_row(ty.shape()), RowStyle::Heading)?;
            self.header_written = true;
        }

        let mut added = 0;
        for item in items {
            let item: Storable<'a> = item.into();
            for instance in item {
                let row = encode_record(instance, ty, &codec)?;
                #[cfg(feature = "tracing")]
                tracing::debug!(row = writer.rows_written() + 1, "write {}", instance.type_name());
                writer.write_row(&row, RowStyle::Data)?;
                added += 1;
                self.stored += 1;
            }
        }
        Ok(added)
    }

    /// Lazily decode the records stored on disk.
    ///
    /// With a bound type its attributes are used (and checked against the
    /// stored header). Otherwise a generic type named `name` is built from
    /// the header. Reads the file as last saved; rows stored by this session
    /// are not visible until it is closed.
    pub fn records(&self, name: &str) -> Result<Records<R>> {
        let reader = open_reader(&self.path, self.format, &self.config.backend)?;
        let mut rows = reader.into_rows();
        let header = rows.next().transpose()?.ok_or_else(|| Error::MissingHeader {
            path: self.path.clone(),
        })?;

        let (ty, infer) = match &self.record_type {
            Some(ty) => {
                check_header(ty, &header, self.config.validate_header)?;
                (ty.clone(), false)
            }
            None => {
                let ty = RecordType::from_header(name, &header)?;
                #[cfg(feature = "tracing")]
                tracing::debug!(record_type = %ty, "built record type from header");
                (ty, self.config.infer_schema)
            }
        };

        Ok(Records {
            rows,
            ty,
            codec: ValueCodec::for_format(self.format, false)
                .with_inference(self.config.type_inference),
            row: 1,
            infer,
            _record: PhantomData,
        })
    }

    /// Every stored record, plus the record type used to build them.
    pub fn load(&self, name: &str) -> Result<(RecordType, Vec<R>)> {
        let mut records = self.records(name)?;
        let instances = records.by_ref().collect::<Result<Vec<_>>>()?;
        #[cfg(feature = "tracing")]
        tracing::debug!(count = instances.len(), path = %self.path.display(), "records loaded");
        Ok((records.into_record_type(), instances))
    }

    /// Save what was stored and release the file.
    ///
    /// Nothing is written when nothing was stored. If the file is locked the
    /// lock handler decides between retrying and giving up.
    pub fn close(mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        if !self.header_written {
            #[cfg(feature = "tracing")]
            tracing::debug!(path = %self.path.display(), "nothing stored; file left untouched");
            return Ok(());
        }
        loop {
            match writer.save() {
                Ok(()) => {
                    #[cfg(feature = "tracing")]
                    tracing::info!(
                        path = %self.path.display(),
                        records = self.stored,
                        "spreadsheet saved"
                    );
                    return Ok(());
                }
                Err(err) if err.is_locked() => match (self.on_locked)(&self.path) {
                    RetryDecision::Retry => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(path = %self.path.display(), "file locked; retrying save");
                    }
                    RetryDecision::Abort => {
                        return Err(Error::ResourceLocked {
                            path: self.path.clone(),
                            source: err,
                        });
                    }
                },
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Release the file without saving anything stored in this session.
    pub fn abandon(mut self) {
        if let Some(writer) = self.writer.take() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                path = %self.path.display(),
                rows = writer.rows_written(),
                "session abandoned; nothing saved"
            );
            drop(writer);
        }
    }

    /// Run `body` against this session, then close it.
    ///
    /// If `body` fails the session is abandoned and the failure returned.
    pub fn scoped<T, E>(mut self, body: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E>
    where
        E: From<Error>,
    {
        match body(&mut self) {
            Ok(value) => {
                self.close()?;
                Ok(value)
            }
            Err(err) => {
                self.abandon();
                Err(err)
            }
        }
    }
}

impl<R: Record> Drop for Spreadsheet<R> {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take()
            && self.header_written
        {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                path = %self.path.display(),
                rows = writer.rows_written(),
                "spreadsheet dropped without close; nothing saved"
            );
            drop(writer);
        }
    }
}

fn check_header(ty: &RecordType, header: &[CellValue], validate: bool) -> Result<(), SchemaError> {
    if ty.shape().matches_header(header) {
        return Ok(());
    }
    let found: Vec<String> = header
        .iter()
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect();
    #[cfg(feature = "tracing")]
    tracing::warn!(record_type = ty.name(), ?found, "stored header differs from attributes");
    if !validate {
        return Ok(());
    }
    Err(SchemaError::HeaderMismatch {
        expected: ty.shape().names().map(str::to_string).collect(),
        found,
    })
}

/// Lazy record iterator returned by [`Spreadsheet::records`].
pub struct Records<R> {
    rows: RowIter,
    ty: RecordType,
    codec: ValueCodec,
    row: u32,
    infer: bool,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Records<R> {
    /// The record type used so far; refined after the first row when inferring.
    pub fn record_type(&self) -> &RecordType {
        &self.ty
    }

    pub fn into_record_type(self) -> RecordType {
        self.ty
    }

    fn decode(&mut self, cells: Vec<CellValue>) -> Result<R> {
        let row = self.row;
        let values = decode_cells(cells, self.ty.shape(), &self.codec)
            .map_err(|source| Error::Decode { row, source })?;
        if self.infer {
            self.ty = self.ty.with_shape(self.ty.shape().refine(&values));
            self.infer = false;
        }
        R::construct(&self.ty, values).map_err(|source| Error::Decode { row, source })
    }
}

impl<R: Record> Iterator for Records<R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        let cells = match self.rows.next()? {
            Ok(cells) => cells,
            Err(err) => return Some(Err(err.into())),
        };
        self.row += 1;
        Some(self.decode(cells))
    }
}
