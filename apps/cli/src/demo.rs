//! Walkthrough of an integer stack and a record stack sharing one arena

use std::fmt;
use std::io::Write;

use anyhow::Result;
use fixmem_memory::allocator::Allocator;
use fixmem_memory::{ArenaConfig, FixedArena, Stack};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: u32,
    pub salary: f64,
    pub name: String,
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{id:{}, salary:{}, name:{}}}", self.id, self.salary, self.name)
    }
}

fn line<T: fmt::Display, A: Allocator>(stack: &Stack<T, A>) -> String {
    stack
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn run(config: &ArenaConfig, out: &mut impl Write) -> Result<()> {
    let arena = FixedArena::with_config(config.clone())?;
    info!(capacity = arena.capacity(), "demo arena ready");

    writeln!(out, "Test 1: Integer Stack")?;
    let mut numbers = Stack::new_in(&arena);
    for value in [10, 20, 30, 40] {
        numbers.push(value)?;
    }
    writeln!(out, "Stack contents: {}", line(&numbers))?;
    writeln!(out, "Top element: {}", numbers.top()?)?;

    numbers.pop();
    writeln!(out, "After pop: {}", line(&numbers))?;

    numbers.push(50)?;
    writeln!(out, "After pushing 50: {}", line(&numbers))?;
    writeln!(out)?;

    writeln!(out, "Test 2: Complex Types Stack")?;
    let mut people = Stack::new_in(&arena);
    let staff = [
        (1, 50_000.0, "Ivan"),
        (2, 60_000.0, "Maria"),
        (3, 75_000.0, "Alexey"),
    ];
    for (id, salary, name) in staff {
        people.push(Person {
            id,
            salary,
            name: name.to_owned(),
        })?;
    }

    writeln!(out, "Employees in stack:")?;
    for person in &people {
        writeln!(out, "  {person}")?;
    }
    writeln!(out)?;
    writeln!(out, "Top element: {}", people.top()?)?;

    people.pop();
    writeln!(out, "After pop:")?;
    for person in &people {
        writeln!(out, "  {person}")?;
    }

    drop(people);
    drop(numbers);
    info!(stats = %arena.stats(), "demo finished");
    Ok(())
}
