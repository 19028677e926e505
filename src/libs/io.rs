use crate::libs::score::ScoreRecord;
use crate::libs::trajectory::GenotypeTable;
use calamine::{open_workbook_auto, Data, Reader};
use indexmap::IndexMap;
use rust_xlsxwriter::Workbook;
use std::io::{BufRead, Write};

pub const SORTED_SHEET: &str = "sorted";
pub const EDGES_SHEET: &str = "edges";
pub const SCORES_SHEET: &str = "scores";

const EDGE_FIELDS: [&str; 2] = ["Identity", "Parent"];
const SCORE_FIELDS: [&str; 7] = [
    "Descendant",
    "Background",
    "Additive",
    "Derivative",
    "Area",
    "Total",
    "Informative",
];

pub fn is_xlsx(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".xlsx")
}

/// Read a sorted genotype table.
///
/// The first row is a header: a label column, then one column per timepoint.
/// Columns whose header is not a number (e.g. `members`) are ignored, empty cells are 0.
/// `.xlsx` files are read from `sheet`, anything else as TSV.
pub fn read_table(infile: &str, sheet: &str) -> anyhow::Result<GenotypeTable> {
    let rows = if is_xlsx(infile) {
        read_sheet(infile, sheet)?
    } else {
        read_tsv(infile)?
    };
    parse_table(rows)
}

/// Read a `genotype -> parent` table, as written by [`write_edges`].
///
/// A header row starting with `Identity` is skipped.
pub fn read_edges(infile: &str, sheet: &str) -> anyhow::Result<IndexMap<String, String>> {
    let rows = if is_xlsx(infile) {
        read_sheet(infile, sheet)?
    } else {
        read_tsv(infile)?
    };

    let mut edges = IndexMap::new();
    for (i, row) in rows.iter().enumerate() {
        if i == 0 && row.first().map_or(false, |c| c.eq_ignore_ascii_case("identity")) {
            continue;
        }
        if row.len() < 2 || row[0].is_empty() || row[1].is_empty() {
            anyhow::bail!("{}: line {} needs two columns", infile, i + 1);
        }
        if edges.insert(row[0].clone(), row[1].clone()).is_some() {
            anyhow::bail!("{}: {} has more than one parent", infile, row[0]);
        }
    }

    Ok(edges)
}

pub fn write_edges(
    writer: &mut dyn Write,
    parents: &IndexMap<String, String>,
) -> anyhow::Result<()> {
    writer.write_all(format!("{}\n", EDGE_FIELDS.join("\t")).as_ref())?;
    for (genotype, parent) in parents {
        writer.write_all(format!("{}\t{}\n", genotype, parent).as_ref())?;
    }
    Ok(())
}

pub fn write_scores(writer: &mut dyn Write, records: &[ScoreRecord]) -> anyhow::Result<()> {
    writer.write_all(format!("{}\n", SCORE_FIELDS.join("\t")).as_ref())?;
    for record in records {
        writer.write_all(
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
                record.descendant,
                record.background,
                record.score.additive,
                record.score.derivative,
                record.score.area,
                record.score.total,
                record.score.informative,
            )
            .as_ref(),
        )?;
    }
    Ok(())
}

/// A workbook with an `edges` and a `scores` sheet.
pub fn write_xlsx(
    outfile: &str,
    parents: &IndexMap<String, String>,
    records: &[ScoreRecord],
) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(EDGES_SHEET)?;
        for (col, field) in EDGE_FIELDS.iter().enumerate() {
            sheet.write_string(0, col as u16, *field)?;
        }
        for (i, (genotype, parent)) in parents.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, genotype.as_str())?;
            sheet.write_string(row, 1, parent.as_str())?;
        }
    }

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SCORES_SHEET)?;
        for (col, field) in SCORE_FIELDS.iter().enumerate() {
            sheet.write_string(0, col as u16, *field)?;
        }
        for (i, record) in records.iter().enumerate() {
            let row = (i + 1) as u32;
            sheet.write_string(row, 0, record.descendant.as_str())?;
            sheet.write_string(row, 1, record.background.as_str())?;
            sheet.write_number(row, 2, record.score.additive)?;
            sheet.write_number(row, 3, record.score.derivative)?;
            sheet.write_number(row, 4, record.score.area)?;
            sheet.write_number(row, 5, record.score.total)?;
            sheet.write_number(row, 6, record.score.informative as f64)?;
        }
    }

    workbook.save(outfile)?;
    Ok(())
}

fn read_tsv(infile: &str) -> anyhow::Result<Vec<Vec<String>>> {
    let reader = intspan::reader(infile);
    let mut rows = vec![];
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        rows.push(line.split('\t').map(|s| s.trim().to_string()).collect());
    }
    Ok(rows)
}

fn read_sheet(infile: &str, sheet: &str) -> anyhow::Result<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto(infile)?;
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| anyhow::anyhow!("{}: can't read sheet {}: {}", infile, sheet, e))?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();
    Ok(rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn parse_table(rows: Vec<Vec<String>>) -> anyhow::Result<GenotypeTable> {
    let mut iter = rows.into_iter();
    let header = match iter.next() {
        Some(header) => header,
        None => return Ok(GenotypeTable::default()),
    };

    // (column, timepoint)
    let columns: Vec<(usize, f64)> = header
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(col, cell)| cell.parse::<f64>().ok().map(|t| (col, t)))
        .collect();
    if columns.is_empty() {
        anyhow::bail!("No timepoint columns in header: {}", header.join("\t"));
    }

    let mut table = GenotypeTable::new(columns.iter().map(|(_, t)| *t).collect());
    for row in iter {
        let label = match row.first() {
            Some(label) if !label.is_empty() => label.clone(),
            _ => anyhow::bail!("Row without a genotype label: {}", row.join("\t")),
        };

        let mut frequencies = Vec::with_capacity(columns.len());
        for (col, _) in &columns {
            let cell = row.get(*col).map(|s| s.as_str()).unwrap_or("");
            let value = if cell.is_empty() {
                0.0
            } else {
                cell.parse::<f64>().map_err(|_| {
                    anyhow::anyhow!("{}: {} is not a frequency", label, cell)
                })?
            };
            frequencies.push(value);
        }
        table.push(label, frequencies)?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::score::PairScore;

    fn rows(lines: &[&str]) -> Vec<Vec<String>> {
        lines
            .iter()
            .map(|l| l.split('\t').map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_parse_table() {
        let table = parse_table(rows(&[
            "Genotype\tmembers\t0\t17\t25",
            "genotype-0\t\t1\t1\t1",
            "genotype-1\tA|B\t0\t0.2\t",
        ]))
        .unwrap();

        assert_eq!(table.timepoints(), &[0.0, 17.0, 25.0]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("genotype-1").unwrap().frequencies(), &[0.0, 0.2, 0.0]);
    }

    #[test]
    fn test_parse_table_errors() {
        assert!(parse_table(rows(&["Genotype\tmembers", "genotype-0\tA"])).is_err());
        assert!(parse_table(rows(&["Genotype\t0\t1", "genotype-0\t1\tx"])).is_err());
        assert!(parse_table(rows(&["Genotype\t0\t1", "\t1\t1"])).is_err());
        assert!(parse_table(rows(&["Genotype\t0\t1", "genotype-0\t1\t1.5"])).is_err());
        assert!(parse_table(vec![]).unwrap().is_empty());
    }

    #[test]
    fn test_write_edges() {
        let mut parents = IndexMap::new();
        parents.insert("genotype-1".to_string(), "genotype-0".to_string());
        parents.insert("genotype-2".to_string(), "genotype-1".to_string());

        let mut out: Vec<u8> = vec![];
        write_edges(&mut out, &parents).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Identity\tParent\ngenotype-1\tgenotype-0\ngenotype-2\tgenotype-1\n"
        );
    }

    #[test]
    fn test_write_scores() {
        let records = vec![ScoreRecord {
            descendant: "genotype-1".to_string(),
            background: "genotype-0".to_string(),
            score: PairScore {
                additive: 3.0,
                derivative: 0.0,
                area: -0.5,
                total: 2.5,
                informative: 4,
            },
        }];

        let mut out: Vec<u8> = vec![];
        write_scores(&mut out, &records).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert!(out.starts_with("Descendant\tBackground\t"));
        assert!(out.contains("genotype-1\tgenotype-0\t3\t0\t-0.5\t2.5\t4\n"));
    }

    #[test]
    fn test_edges_tsv() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("known.tsv");
        std::fs::write(&path, "Identity\tParent\ngenotype-3\tgenotype-1\n\n")?;

        let edges = read_edges(path.to_str().unwrap(), EDGES_SHEET)?;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges.get("genotype-3").map(|s| s.as_str()), Some("genotype-1"));

        // No header, duplicated genotype
        std::fs::write(&path, "genotype-3\tgenotype-1\ngenotype-3\tgenotype-2\n")?;
        assert!(read_edges(path.to_str().unwrap(), EDGES_SHEET).is_err());

        Ok(())
    }

    #[test]
    fn test_xlsx() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;

        // Sorted table, as a spreadsheet with numeric timepoint headers
        let table_path = dir.path().join("table.xlsx");
        let table_file = table_path.to_str().unwrap();
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name(SORTED_SHEET)?;
            sheet.write_string(0, 0, "Genotype")?;
            for (col, t) in [0.0, 10.0, 20.0].iter().enumerate() {
                sheet.write_number(0, (col + 1) as u16, *t)?;
            }
            sheet.write_string(1, 0, "genotype-0")?;
            sheet.write_string(2, 0, "genotype-1")?;
            for (col, f) in [0.0, 0.25, 0.5].iter().enumerate() {
                sheet.write_number(1, (col + 1) as u16, 1.0)?;
                sheet.write_number(2, (col + 1) as u16, *f)?;
            }
        }
        workbook.save(table_file)?;

        let table = read_table(table_file, SORTED_SHEET)?;
        assert_eq!(table.timepoints(), &[0.0, 10.0, 20.0]);
        assert_eq!(table.get("genotype-1").unwrap().frequencies(), &[0.0, 0.25, 0.5]);
        assert!(read_table(table_file, "missing").is_err());

        // Output workbook
        let out_path = dir.path().join("out.xlsx");
        let out_file = out_path.to_str().unwrap();
        let mut parents = IndexMap::new();
        parents.insert("genotype-1".to_string(), "genotype-0".to_string());
        write_xlsx(out_file, &parents, &[])?;

        let edges = read_edges(out_file, EDGES_SHEET)?;
        assert_eq!(edges, parents);

        Ok(())
    }
}
