//! Cluster evaluation
//!
//! Orthogonally connected groups of one symbol (wilds join any group) pay by
//! size. Every non-wild cell not already claimed seeds a flood fill, scanning
//! reel-major; a wild may belong to several clusters. Paying clusters are
//! flagged to explode.

use rf_core::Position;

use super::{EvalContext, PayoutStrategy, WinMeta, WinRecord, WinResult};
use crate::board::Board;
use crate::config::WinType;

/// A connected group of one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub symbol: String,
    pub positions: Vec<Position>,
}

impl Cluster {
    pub fn size(&self) -> u32 {
        self.positions.len() as u32
    }

    /// Mean position, rounded half to even
    pub fn center(&self) -> Position {
        let n = self.positions.len().max(1) as f64;
        let reel: f64 = self.positions.iter().map(|p| p.reel as f64).sum::<f64>() / n;
        let row: f64 = self.positions.iter().map(|p| p.row as f64).sum::<f64>() / n;
        Position::new(reel.round_ties_even() as usize, row.round_ties_even() as usize)
    }
}

/// Cluster-pays evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusterEvaluator;

impl ClusterEvaluator {
    /// Every cluster on the board, grouped by symbol in first-seen order
    pub fn find_clusters(board: &Board) -> Vec<Cluster> {
        let mut claimed: Vec<Vec<bool>> = board.reels.iter().map(|r| vec![false; r.len()]).collect();
        let mut clusters = Vec::new();

        for pos in board.positions().collect::<Vec<_>>() {
            let Some(seed) = board.get(pos) else { continue };
            if claimed[pos.reel][pos.row] || seed.is_wild() {
                continue;
            }
            let mut visited: Vec<Vec<bool>> = board.reels.iter().map(|r| vec![false; r.len()]).collect();
            visited[pos.reel][pos.row] = true;
            claimed[pos.reel][pos.row] = true;
            let mut positions = vec![pos];
            flood(board, seed.name(), pos, &mut visited, &mut claimed, &mut positions);
            clusters.push(Cluster {
                symbol: seed.name().to_string(),
                positions,
            });
        }

        // stable grouping by first appearance of each symbol
        let mut order: Vec<String> = Vec::new();
        for c in &clusters {
            if !order.contains(&c.symbol) {
                order.push(c.symbol.clone());
            }
        }
        clusters.sort_by_key(|c| order.iter().position(|s| *s == c.symbol));
        clusters
    }

    fn cluster_multiplier(board: &Board, cluster: &Cluster, ctx: &EvalContext<'_>) -> f64 {
        let sum: f64 = match ctx.position_multipliers {
            Some(grid) => cluster
                .positions
                .iter()
                .filter_map(|p| grid.get(p.reel)?.get(p.row))
                .map(|v| f64::from(*v))
                .sum(),
            None => cluster
                .positions
                .iter()
                .filter_map(|p| board.get(*p)?.multiplier())
                .filter(|m| *m > 0.0)
                .sum(),
        };
        sum.max(1.0)
    }
}

/// Depth-first fill; neighbours are visited left, right, up, down
fn flood(
    board: &Board,
    symbol: &str,
    from: Position,
    visited: &mut [Vec<bool>],
    claimed: &mut [Vec<bool>],
    cluster: &mut Vec<Position>,
) {
    let mut neighbours = Vec::with_capacity(4);
    if from.reel > 0 {
        neighbours.push(Position::new(from.reel - 1, from.row));
    }
    if from.reel + 1 < board.num_reels() {
        neighbours.push(Position::new(from.reel + 1, from.row));
    }
    if from.row > 0 {
        neighbours.push(Position::new(from.reel, from.row - 1));
    }
    if from.row + 1 < board.rows(from.reel) {
        neighbours.push(Position::new(from.reel, from.row + 1));
    }
    neighbours.retain(|p| p.row < board.rows(p.reel) && !visited[p.reel][p.row]);
    for p in &neighbours {
        visited[p.reel][p.row] = true;
    }

    for next in neighbours {
        let joins = board
            .get(next)
            .is_some_and(|s| s.is_wild() || s.name() == symbol);
        if joins {
            cluster.push(next);
            claimed[next.reel][next.row] = true;
            flood(board, symbol, next, visited, claimed, cluster);
        }
    }
}

impl PayoutStrategy for ClusterEvaluator {
    fn win_type(&self) -> WinType {
        WinType::Cluster
    }

    fn evaluate(&self, board: &mut Board, ctx: &EvalContext<'_>) -> WinResult {
        let mut result = WinResult::new();
        for cluster in Self::find_clusters(board) {
            let Some(pay) = ctx.config.paytable.get(cluster.size(), &cluster.symbol) else {
                continue;
            };
            let cluster_mult = Self::cluster_multiplier(board, &cluster, ctx);
            for pos in &cluster.positions {
                if let Some(cell) = board.get_mut(*pos) {
                    cell.mark_explode();
                }
            }
            result.push(WinRecord {
                kind: cluster.size(),
                win: pay * cluster_mult * ctx.global_multiplier,
                meta: WinMeta {
                    global_multiplier: ctx.global_multiplier,
                    multiplier: cluster_mult * ctx.global_multiplier,
                    win_without_mult: pay,
                    cluster_multiplier: Some(cluster_mult),
                    overlay: Some(cluster.center()),
                    ..Default::default()
                },
                symbol: cluster.symbol,
                positions: cluster.positions,
            });
        }
        result
    }
}
