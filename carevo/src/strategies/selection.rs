use super::{ScoredAgent, SelectionStrategy, StrategyError};

use carevo_nn::networks::Network;

use rand::distributions::{Distribution, WeightedIndex};
use rand::RngCore;

/// Fitness-proportionate selection: each draw picks
/// an agent with probability fitness / total fitness.
///
/// Fitness values must be finite and non-negative,
/// with a positive sum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RouletteWheel;

impl RouletteWheel {
    /// Draws `count` agent indices with replacement.
    pub(crate) fn draw_indices(
        agents: &[ScoredAgent],
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, StrategyError> {
        if agents.is_empty() {
            return Err(StrategyError::NoAgents);
        }
        if let Some((index, agent)) = agents
            .iter()
            .enumerate()
            .find(|(_, a)| !a.fitness.is_finite() || a.fitness < 0.0)
        {
            return Err(StrategyError::InvalidFitness {
                index,
                fitness: agent.fitness,
            });
        }
        // Sums of f32 fitness values cannot overflow an f64.
        let total: f64 = agents.iter().map(|a| f64::from(a.fitness)).sum();
        if !(total > 0.0 && total.is_finite()) {
            return Err(StrategyError::DegenerateFitness(total as f32));
        }
        let wheel = WeightedIndex::new(agents.iter().map(|a| f64::from(a.fitness)))
            .map_err(|_| StrategyError::DegenerateFitness(total as f32))?;
        Ok((0..count).map(|_| wheel.sample(rng)).collect())
    }
}

impl SelectionStrategy for RouletteWheel {
    fn select(
        &mut self,
        agents: &[ScoredAgent],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError> {
        let indices = Self::draw_indices(agents, agents.len(), rng)?;
        Ok(copy_chosen(agents, &indices))
    }
}

/// Rank-proportionate selection: agents are sorted by
/// ascending fitness and the agent of rank `r` (0-based)
/// is drawn with probability `2r / (n(n-1))`.
///
/// The worst agent is never chosen, and only the order
/// of fitness values matters, so negative fitness is
/// accepted. A single agent is always chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RankBased;

impl RankBased {
    /// Draws `count` agent indices with replacement.
    pub(crate) fn draw_indices(
        agents: &[ScoredAgent],
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>, StrategyError> {
        if agents.is_empty() {
            return Err(StrategyError::NoAgents);
        }
        if let Some((index, agent)) = agents.iter().enumerate().find(|(_, a)| a.fitness.is_nan()) {
            return Err(StrategyError::InvalidFitness {
                index,
                fitness: agent.fitness,
            });
        }
        let n = agents.len();
        if n == 1 {
            return Ok(vec![0; count]);
        }

        let mut by_rank: Vec<usize> = (0..n).collect();
        by_rank.sort_by(|&a, &b| agents[a].fitness.total_cmp(&agents[b].fitness));

        let normalizer = (n * (n - 1)) as f64;
        let ranks = WeightedIndex::new((0..n).map(|r| 2.0 * r as f64 / normalizer))
            .map_err(|_| StrategyError::DegenerateFitness(0.0))?;
        Ok((0..count).map(|_| by_rank[ranks.sample(rng)]).collect())
    }
}

impl SelectionStrategy for RankBased {
    fn select(
        &mut self,
        agents: &[ScoredAgent],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Network>, StrategyError> {
        let indices = Self::draw_indices(agents, agents.len(), rng)?;
        Ok(copy_chosen(agents, &indices))
    }
}

/// Deep copies of the networks at `indices`.
fn copy_chosen(agents: &[ScoredAgent], indices: &[usize]) -> Vec<Network> {
    indices
        .iter()
        .map(|&i| Network::clone(&agents[i].network))
        .collect()
}
