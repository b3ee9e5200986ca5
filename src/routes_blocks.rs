// --------------------------------------------------
// Handles API endpoints for recording a day.
//
// Responsibilities:
// - Read the 80 blocks of a day
// - Upsert one block / many blocks
// - List categories and the slot timetable
// - Resolve a clock time to its slot
// --------------------------------------------------

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::models::{Block, BlockInput, Category};
use crate::slots;
use crate::store::BlockUpdate;
use crate::AppState;

// -----------------------------
// GET /api/day/:date
// All 80 blocks, unset ones with category = null
// -----------------------------
pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<Vec<Block>>> {
    let date = slots::parse_date(&date)?;
    let blocks = state.store.day_blocks(date)?;
    Ok(Json(blocks))
}

// -----------------------------
// POST /api/block
// Inserts or overwrites one slot
// -----------------------------
pub async fn upsert_block(
    State(state): State<AppState>,
    Json(input): Json<BlockInput>,
) -> AppResult<Json<Block>> {
    let update = BlockUpdate::validate(input)?;
    let block = state.store.upsert_block(update)?;
    tracing::debug!(date = %block.date, slot = block.slot_index, "block upserted");
    Ok(Json(block))
}

#[derive(Debug, Deserialize)]
pub struct BulkInput {
    pub blocks: Vec<BlockInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BulkResponse {
    pub processed: usize,
    pub requested: usize,
}

// -----------------------------
// POST /api/bulk
// Every block is validated before anything is written,
// so a bad entry rejects the whole request
// -----------------------------
pub async fn bulk_upsert(
    State(state): State<AppState>,
    Json(input): Json<BulkInput>,
) -> AppResult<Json<BulkResponse>> {
    if input.blocks.is_empty() {
        return Err(AppError::Validation("no blocks to update".into()));
    }
    let requested = input.blocks.len();

    let updates = input
        .blocks
        .into_iter()
        .map(BlockUpdate::validate)
        .collect::<AppResult<Vec<_>>>()?;

    let processed = state.store.bulk_upsert(updates)?;
    tracing::info!(processed, "bulk upsert");

    Ok(Json(BulkResponse {
        processed,
        requested,
    }))
}

// -----------------------------
// GET /api/categories
// Ordered by order_index
// -----------------------------
pub async fn get_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.store.categories()?))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlotResponse {
    pub slot_index: i64,
    pub start_time: String,
}

// -----------------------------
// GET /api/slots
// -----------------------------
pub async fn get_slots() -> Json<Vec<SlotResponse>> {
    Json(
        slots::all_slots()
            .into_iter()
            .map(|(slot_index, start_time)| SlotResponse {
                slot_index,
                start_time,
            })
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub time: String, // "HH:MM"
}

// -----------------------------
// GET /api/slot?time=HH:MM
// Slot containing that time, floored to the slot start
// -----------------------------
pub async fn get_slot_for_time(Query(q): Query<SlotQuery>) -> AppResult<Json<SlotResponse>> {
    let slot_index = slots::time_to_slot(&q.time)?;
    Ok(Json(SlotResponse {
        slot_index,
        start_time: slots::slot_to_time(slot_index)?,
    }))
}
