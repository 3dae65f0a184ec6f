//! Game rendering system (terminal).
//!
//! Turns a [`Snapshot`] into text for the demo binary.

use crate::game::entities::EntityKind;
use crate::game::snapshot::{CellView, Snapshot};
use crate::game::state::Phase;
use crate::game::types::{GhostFlavor, ItemKind, ItemSubtype, TraitSet, TraitTag};

fn trait_mark(traits: TraitSet) -> char {
    if traits.contains(TraitTag::Haunted) {
        '!'
    } else if traits.contains(TraitTag::Fire) {
        '*'
    } else if traits.contains(TraitTag::Ice) {
        '~'
    } else if traits.contains(TraitTag::Sentient) {
        '?'
    } else {
        ' '
    }
}

/// Two-character symbol for one cell.
pub fn cell_symbol(cell: &CellView) -> String {
    let Some(entity) = &cell.entity else {
        return match (cell.delivery, cell.aura.fire, cell.aura.ice) {
            (true, _, _) => "[]".to_string(),
            (_, true, _) => ",,".to_string(),
            (_, _, true) => "..".to_string(),
            _ => "  ".to_string(),
        };
    };
    let letter = match entity.kind {
        EntityKind::Ghost(state) => match state.flavor {
            GhostFlavor::Wisp => 'G',
            GhostFlavor::Ember => 'E',
            GhostFlavor::Frost => 'F',
        },
        EntityKind::TraitTile(TraitTag::Fire) => '#',
        EntityKind::TraitTile(_) => '=',
        EntityKind::Item(ItemKind::PlainBox) => 'X',
        EntityKind::Item(_) => match entity.subtype {
            ItemSubtype::Bread => 'b',
            ItemSubtype::Knife => 'k',
            ItemSubtype::Bottle => 'p',
            ItemSubtype::Ghost | ItemSubtype::TraitTile => '?',
        },
    };
    let second = if cell.is_anchor { trait_mark(entity.traits) } else { '+' };
    format!("{}{}", letter, second)
}

/// One text line per grid row. The selected cell is wrapped in `<>`.
pub fn render_rows(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .cells
        .chunks(snapshot.grid_size.max(1))
        .map(|row| {
            row.iter()
                .map(|cell| {
                    let symbol = cell_symbol(cell);
                    if cell.selected { format!("<{}>", symbol) } else { format!(" {} ", symbol) }
                })
                .collect::<String>()
        })
        .collect()
}

/// Print the grid to the terminal.
pub fn print_grid(snapshot: &Snapshot) {
    for line in render_rows(snapshot) {
        println!("{}", line);
    }
    println!();
}

/// Print reputation, order, capacity and status lines.
pub fn print_hud(snapshot: &Snapshot) {
    let capacity = &snapshot.capacity;
    println!("--- Stage {}: {} (tick {}) ---", snapshot.stage + 1, snapshot.stage_name, snapshot.tick);
    if !snapshot.narrative.is_empty() {
        println!("{}", snapshot.narrative);
    }
    println!("REP: {}", snapshot.reputation);
    match &snapshot.order {
        Some(order) => println!(
            "WANTED: {:?} {:?} TIME: {}",
            order.spec.subtype,
            Vec::from(order.spec.required),
            order.time_left.ceil() as i32
        ),
        None => println!("WANTED: -"),
    }
    println!(
        "ENERGY: {:.0}/{:.0} (base {:.0}) locks hp {:.0} weight {:.0} heat {:.0} cold {:.0}",
        capacity.energy,
        capacity.max_effective,
        capacity.max_base,
        capacity.locks.hp,
        capacity.locks.weight,
        capacity.locks.heat,
        capacity.locks.cold
    );
    let next: Vec<String> = snapshot.conveyor.iter().map(|i| format!("{:?}/{:?}", i.subtype, i.kind)).collect();
    println!("NEXT: {}", next.join(", "));
    if snapshot.immunity.fire > 0.0 || snapshot.immunity.ice > 0.0 {
        println!("IMMUNE: fire {:.1}s ice {:.1}s", snapshot.immunity.fire, snapshot.immunity.ice);
    }
    match snapshot.phase {
        Phase::Running => println!("STATUS: {}", snapshot.status),
        Phase::GameOver(reason) => println!("GAME OVER ({:?})", reason),
    }
    println!();
}

pub fn print_snapshot(snapshot: &Snapshot) {
    print_grid(snapshot);
    print_hud(snapshot);
}
