//! 抽奖引擎
//!
//! 纯计算：每个玩家按报名次数（entries）各掷一次 1..=1000，
//! 取最高点作为成绩，按成绩降序排名（稳定排序，平局按输入顺序），
//! 前 N 名依次获得奖品列表中的奖品。
//!
//! 引擎不做任何 I/O，也不持有状态；随机数由调用方注入。

pub mod random;

pub use random::{RandomSource, RngSource, ScriptedRolls};

use crate::models::{Player, Prize, WinnerRecord};
use thiserror::Error;

/// 单次掷骰最小值
pub const ROLL_MIN: u32 = 1;
/// 单次掷骰最大值
pub const ROLL_MAX: u32 = 1000;
/// 排名在奖品数量之外的玩家
pub const NO_PRIZE: &str = "no prize";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawingError {
    #[error("{0}")]
    InvalidInput(String),
}

/// 校验引擎前置条件，不消耗任何随机数
pub fn validate_inputs(players: &[Player], prizes: &[Prize]) -> Result<(), DrawingError> {
    if players.is_empty() {
        return Err(DrawingError::InvalidInput(
            "Please add at least one player".into(),
        ));
    }
    if prizes.is_empty() {
        return Err(DrawingError::InvalidInput(
            "Please add at least one prize".into(),
        ));
    }
    if players.len() < prizes.len() {
        return Err(DrawingError::InvalidInput(
            "Number of players must be greater than or equal to number of prizes".into(),
        ));
    }
    if let Some(p) = players.iter().find(|p| p.entries < 1) {
        return Err(DrawingError::InvalidInput(format!(
            "Entries must be greater than 0 (player '{}')",
            p.name
        )));
    }
    Ok(())
}

/// 进行一次抽奖
///
/// 返回的列表长度等于玩家数，按 rank 升序排列。
/// 输入不合法时直接返回 `InvalidInput`，此时不会产生任何掷骰。
pub fn conduct_drawing<R>(
    players: &[Player],
    prizes: &[Prize],
    rng: &mut R,
) -> Result<Vec<WinnerRecord>, DrawingError>
where
    R: RandomSource + ?Sized,
{
    validate_inputs(players, prizes)?;

    let mut rolled: Vec<(&Player, u32, Vec<u32>)> = Vec::with_capacity(players.len());
    for player in players {
        let mut rolls = Vec::with_capacity(player.entries as usize);
        for _ in 0..player.entries {
            rolls.push(rng.next_in_range(ROLL_MIN, ROLL_MAX));
        }
        let highest = rolls.iter().copied().max().unwrap_or(ROLL_MIN);
        rolled.push((player, highest, rolls));
    }

    // sort_by 是稳定排序，平局保持输入顺序
    rolled.sort_by(|a, b| b.1.cmp(&a.1));

    let winners = rolled
        .into_iter()
        .enumerate()
        .map(|(index, (player, highest_roll, all_rolls))| WinnerRecord {
            player: player.name.clone(),
            highest_roll,
            all_rolls,
            prize: prizes
                .get(index)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| NO_PRIZE.to_string()),
            rank: index as u32 + 1,
        })
        .collect();

    Ok(winners)
}
