//! Capacity transitions of a stack growing and draining inside one arena

use std::io::Write;

use anyhow::Result;
use fixmem_memory::{ArenaConfig, FixedArena, Stack};

pub fn run(config: &ArenaConfig, pushes: usize, out: &mut impl Write) -> Result<()> {
    let arena = FixedArena::with_config(config.clone())?;
    writeln!(out, "arena: {} bytes", arena.capacity())?;

    let mut stack = Stack::new_in(&arena);
    let mut capacity = stack.capacity();

    for value in 0..pushes as u64 {
        stack.push(value)?;
        if stack.capacity() != capacity {
            report(out, &arena, "grow", capacity, stack.capacity(), stack.len())?;
            capacity = stack.capacity();
        }
    }

    while stack.pop().is_some() {
        if stack.capacity() != capacity {
            report(out, &arena, "shrink", capacity, stack.capacity(), stack.len())?;
            capacity = stack.capacity();
        }
    }

    drop(stack);
    writeln!(out, "final: {}", arena.stats())?;
    Ok(())
}

fn report(
    out: &mut impl Write,
    arena: &FixedArena,
    kind: &str,
    from: usize,
    to: usize,
    len: usize,
) -> Result<()> {
    let stats = arena.stats();
    writeln!(
        out,
        "{kind} {from} -> {to} at len {len}: used {} bytes, live blocks {}, peak {} bytes, {}",
        stats.used,
        stats.live_blocks,
        stats.peak_used,
        arena.fragmentation()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_are_reported() {
        let mut out = Vec::new();
        run(&ArenaConfig::new(4096), 20, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        for line in [
            "grow 0 -> 4 at len 1",
            "grow 4 -> 8 at len 5",
            "grow 8 -> 16 at len 9",
            "grow 16 -> 32 at len 17",
            "shrink 32 -> 16 at len 7",
            "shrink 16 -> 8 at len 3",
        ] {
            assert!(text.contains(line), "missing `{line}` in:\n{text}");
        }
        assert!(text.contains("final: allocations: 6, deallocations: 6"));
    }

    #[test]
    fn exhausted_arena_is_an_error() {
        let mut out = Vec::new();
        assert!(run(&ArenaConfig::new(64), 100, &mut out).is_err());
    }
}
