use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::{
    stack::{StackManager, ThreadStackSnapshot},
    Result,
};

impl StackManager {
    /// Write every thread's stack as plain text to the file at `path`.
    ///
    /// The file is created or truncated. Each thread is written from its own snapshot, so
    /// the dump is consistent per thread but not across threads.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be created or written.
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        let threads = self.write_dump(&mut writer)?;
        writer.flush()?;

        info!("Dumped {} thread stacks to {}", threads, path.display());
        Ok(())
    }

    /// Write every thread's stack as plain text, returning the number of threads written.
    ///
    /// ```text
    /// Thread 1: main
    ///     int Program.Run(string s)
    ///     string s = "hello"
    ///         Assembly: App
    ///         Module  : App.dll
    ///
    /// ```
    ///
    /// Frames are listed most recent first.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if writing fails.
    pub fn write_dump<W: Write>(&self, writer: &mut W) -> Result<usize> {
        let snapshots = self.snapshot_all();
        for snapshot in &snapshots {
            write_thread(writer, snapshot)?;
        }
        Ok(snapshots.len())
    }
}

fn write_thread<W: Write>(writer: &mut W, snapshot: &ThreadStackSnapshot) -> Result<()> {
    writeln!(writer, "Thread {}: {}", snapshot.thread_id, snapshot.name)?;
    for frame in snapshot.frames.iter().rev() {
        let info = &frame.function_info;
        writeln!(writer, "    {}", info.method_signature)?;
        for argument in &frame.arguments {
            writeln!(writer, "    {argument}")?;
        }
        writeln!(writer, "        Assembly: {}", info.assembly_name)?;
        writeln!(writer, "        Module  : {}", info.module_name)?;
        writeln!(writer)?;
    }
    Ok(())
}
