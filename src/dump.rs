use crate::layout::Diagram;
use anyhow::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub fn diagram_to_json(diagram: &Diagram) -> Result<String> {
    Ok(serde_json::to_string_pretty(diagram)?)
}

pub fn write_diagram_json(path: &Path, diagram: &Diagram) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, diagram)?;
    Ok(())
}
