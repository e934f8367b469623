//! Flat CSV export of timeseries records.

use crate::ResultsResult;
use crate::types::TimeseriesRecord;
use std::collections::BTreeSet;
use std::io::Write;

/// Write `step,time_min` followed by one column per value name.
///
/// Columns follow `columns` when given, else the sorted union of all value names.
/// Values missing from a record leave the cell empty.
pub fn write_csv<W: Write>(
    mut out: W,
    columns: &[String],
    records: &[TimeseriesRecord],
) -> ResultsResult<()> {
    let fallback: Vec<String>;
    let columns = if columns.is_empty() {
        fallback = records
            .iter()
            .flat_map(|r| r.values.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        &fallback
    } else {
        columns
    };

    write!(out, "step,time_min")?;
    for name in columns {
        write!(out, ",{name}")?;
    }
    writeln!(out)?;

    for record in records {
        write!(out, "{},{}", record.step, record.time_min)?;
        for name in columns {
            match record.get(name) {
                Some(v) => write!(out, ",{v}")?,
                None => write!(out, ",")?,
            }
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn record(step: usize, values: &[(&str, f64)]) -> TimeseriesRecord {
        TimeseriesRecord {
            step,
            time_min: step as f64 * 15.0,
            values: values
                .iter()
                .map(|&(k, v)| (k.to_string(), v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn explicit_column_order() {
        let records = vec![
            record(0, &[("P_out", 0.0), ("heatup", 0.0)]),
            record(1, &[("P_out", 300.0), ("heatup", 1.0)]),
        ];
        let columns = vec!["heatup".to_string(), "P_out".to_string()];
        let mut buf = Vec::new();
        write_csv(&mut buf, &columns, &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "step,time_min,heatup,P_out\n0,0,0,0\n1,15,1,300\n"
        );
    }

    #[test]
    fn union_of_names_when_no_columns() {
        let records = vec![record(0, &[("b", 1.0)]), record(1, &[("a", 2.5)])];
        let mut buf = Vec::new();
        write_csv(&mut buf, &[], &records).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "step,time_min,a,b\n0,0,,1\n1,15,2.5,\n");
    }
}
