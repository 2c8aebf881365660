use camino::Utf8Path;
use rusqlite::{Connection, OpenFlags, params_from_iter};
use tracing::debug;

use crate::domain::ExpressionHit;
use crate::error::GxdbError;

const GENE_QUERY: &str = "
SELECT reporters.probe_gene_predicted, images.url, stainings.staining_localization,
       biomaterials.developmental_stage
FROM reporters
INNER JOIN experiments ON reporters.id = experiments.reporter_id
INNER JOIN images ON experiments.id = images.experiment_id
INNER JOIN stainings ON images.id = stainings.image_id
INNER JOIN biomaterials ON experiments.id = biomaterials.experiment_id
WHERE reporters.probe_gene_predicted IN";

/// Opens an existing database without creating it.
pub fn open_read_only(path: &Utf8Path) -> Result<Connection, GxdbError> {
    if !path.as_std_path().is_file() {
        return Err(GxdbError::DatabaseMissing(path.as_std_path().to_path_buf()));
    }
    let conn = Connection::open_with_flags(
        path.as_std_path(),
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    Ok(conn)
}

/// Image annotations for every reporter whose predicted gene is in `genes`.
/// Matching is exact and case-sensitive; rows come back in join order.
pub fn query_genes(conn: &Connection, genes: &[String]) -> Result<Vec<ExpressionHit>, GxdbError> {
    if genes.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; genes.len()].join(", ");
    let sql = format!("{GENE_QUERY} ({placeholders})");
    let mut statement = conn.prepare(&sql)?;
    let hits = statement
        .query_map(params_from_iter(genes.iter()), |row| {
            Ok(ExpressionHit {
                gene: row.get(0)?,
                image_url: row.get(1)?,
                stain_localization: row.get(2)?,
                developmental_stage: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    debug!(genes = genes.len(), hits = hits.len(), "gene query finished");
    Ok(hits)
}
