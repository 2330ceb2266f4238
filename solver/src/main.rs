use nacre::{Location, PuzzleBuilder, SolverFailure};
use unordered_pair::UnorderedPair;

fn main() {
    let mut puzzle = "\
        ..@O....
        ..O..OO@
        ..O....O
        ........
        ...O..O.
        ...O..O.
        ...@OO@.
        ........"
        .parse::<PuzzleBuilder>()
        .unwrap()
        .build()
        .unwrap();

    println!("{}", puzzle);

    match puzzle.solve() {
        Ok(()) => println!("solved, loop of {} edges after {:?}", puzzle.loop_length(), puzzle.statistics()),
        Err(SolverFailure::Stuck) => println!("stuck after {:?}", puzzle.statistics()),
        Err(failure @ SolverFailure::Inconsistent(_)) => println!("{failure}"),
    }

    println!("{}", puzzle);
    println!("below the top black pearl: {:?}", puzzle.edge_state(UnorderedPair(Location(2, 0), Location(2, 1))));
}
