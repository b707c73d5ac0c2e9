use std::rc::Rc;
use std::time::Instant;

use log::{debug, info, trace};

use crate::color::{Color, Coloring};
use crate::graph::NodeId;
use crate::instance::ColoringProblem;
use crate::search::assignment::AssignmentState;
use crate::search::conflicts::{ConflictLog, ConflictPolicy};
use crate::search::statistics::SearchStatistics;


/** terminal result of a search */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// every node colored, in assignment order
    Satisfiable(Coloring),
    /// the failure involves no assigned node: no coloring exists with this domain
    Unsatisfiable,
}

/** what a single search step did */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// the selected node received a color
    Colored(NodeId, Color),
    /// the selected node could not be colored, the search jumped back to target
    Backjumped {
        /// node whose domain was exhausted
        failed: NodeId,
        /// node that received a new color
        target: NodeId,
    },
    /// all nodes are colored
    Solved,
    /// no backjump target is left, every node is unassigned
    Unsatisfiable,
}


/**
Backtracking search with conflict-directed backjumping.
 - select the unassigned node with maximum degree (ties: lowest id)
 - give it the first color of its live domain not used by an assigned partner.
   every rejected candidate logs the partner that blocked it, and blames it in the
   assignment state.
 - if no color fits, the conflict log is loaded with every culprit of the failed node,
   ordered by assignment. Pop it: rewind to the most recently assigned culprit, which
   inherits the other culprits, and try its next color. A target without colors left
   fails in turn. The search continues once a target gets a new color. It stops when a
   failure has no culprit left (the instance is unsatisfiable).

Each solver owns its search state; the problem is only read.
*/
#[derive(Debug)]
pub struct BackjumpingSolver {
    /// instance
    problem: Rc<ColoringProblem>,
    /// assigned/unassigned partition and live domains
    state: AssignmentState,
    /// nodes that blocked the current assignment attempt
    conflicts: ConflictLog,
    /// search counters
    stats: SearchStatistics,
    /// true once a backjump failed
    exhausted: bool,
}

impl BackjumpingSolver {
    /** creates a solver keeping duplicate conflict entries */
    pub fn new(problem:Rc<ColoringProblem>) -> Self {
        Self::with_policy(problem, ConflictPolicy::default())
    }

    /** creates a solver with the given conflict log policy */
    pub fn with_policy(problem:Rc<ColoringProblem>, policy:ConflictPolicy) -> Self {
        let state = AssignmentState::new(problem.graph(), problem.domain().len());
        Self {
            problem,
            state,
            conflicts: ConflictLog::new(policy),
            stats: SearchStatistics::default(),
            exhausted: false,
        }
    }

    /// instance being solved
    pub fn problem(&self) -> &ColoringProblem { &self.problem }

    /// current search state
    pub fn state(&self) -> &AssignmentState { &self.state }

    /// conflict log of the last assignment attempt
    pub fn conflicts(&self) -> &ConflictLog { &self.conflicts }

    /// search counters
    pub fn statistics(&self) -> &SearchStatistics { &self.stats }

    /// runs the search until a terminal step
    pub fn solve(&mut self) -> SearchOutcome {
        let t_start = Instant::now();
        let outcome = loop {
            match self.step() {
                SearchStep::Solved => break SearchOutcome::Satisfiable(self.state.coloring()),
                SearchStep::Unsatisfiable => break SearchOutcome::Unsatisfiable,
                SearchStep::Colored(..) | SearchStep::Backjumped { .. } => {},
            }
        };
        self.stats.time_searched += t_start.elapsed().as_secs_f32();
        match &outcome {
            SearchOutcome::Satisfiable(_) => info!("solution found ({} nodes)", self.state.nb_assigned()),
            SearchOutcome::Unsatisfiable => info!("no solution exists"),
        }
        outcome
    }

    /// SELECT, then COLOR or BACKJUMP
    pub fn step(&mut self) -> SearchStep {
        if self.exhausted {
            return SearchStep::Unsatisfiable;
        }
        let v = match self.state.select_next() {
            Ok(v) => v,
            Err(_) => return SearchStep::Solved,
        };
        self.stats.nb_selections += 1;
        self.conflicts.clear();
        let res = match self.first_valid_candidate(v) {
            Some(color) => {
                trace!("color {} with {}", self.problem.graph().label(v), self.problem.domain().label(color));
                self.state.commit(v, color);
                self.stats.nb_commits += 1;
                self.stats.max_depth = self.stats.max_depth.max(self.state.nb_assigned());
                SearchStep::Colored(v, color)
            },
            None => {
                self.stats.nb_failures += 1;
                debug!(
                    "dead end on {} (conflicts: {:?})",
                    self.problem.graph().label(v), self.conflicts.entries()
                );
                match self.backjump(v) {
                    Some(target) => SearchStep::Backjumped { failed:v, target },
                    None => {
                        self.exhausted = true;
                        SearchStep::Unsatisfiable
                    }
                }
            }
        };
        debug_assert!(self.state.is_consistent());
        res
    }

    /// node among the assigned partners of v that currently uses color (if any)
    fn blocking_partner(&self, v:NodeId, color:Color) -> Option<NodeId> {
        self.problem.graph().constraints(v).iter().copied()
            .find(|u| self.state.color(*u) == Some(color))
    }

    /** consumes the live domain of v until a candidate is not used by any assigned
    partner. Each rejected candidate records its blocking partner in the conflict log.
    */
    fn first_valid_candidate(&mut self, v:NodeId) -> Option<Color> {
        while let Some(&color) = self.state.domain(v).first() {
            self.stats.nb_candidate_evaluations += 1;
            match self.blocking_partner(v, color) {
                None => return Some(color),
                Some(u) => {
                    self.conflicts.record(u);
                    self.state.blame(v, u);
                    self.state.prune(v, color);
                }
            }
        }
        None
    }

    /// refills the conflict log with the culprits of v, the most recently assigned last
    fn load_culprits(&mut self, v:NodeId) {
        let mut culprits:Vec<NodeId> = self.state.culprits(v).iter().collect();
        culprits.sort_by_key(|u| self.state.position(*u));
        self.conflicts.clear();
        for u in culprits {
            self.conflicts.record(u);
        }
    }

    /** backjumps after the failure of v. v stays unassigned with its full domain.
    Returns the target that received a new color, or None if no assigned node explains
    the failure (every node is unassigned then).
    */
    fn backjump(&mut self, v:NodeId) -> Option<NodeId> {
        self.load_culprits(v);
        self.state.reset(v);
        while let Some(target) = self.conflicts.pop() {
            // culprits are assigned: the rewind finds them
            self.stats.nb_unassigned += self.state.rewind_to(target).ok()?;
            for &u in self.conflicts.entries() {
                self.state.blame(target, u);
            }
            if let Some(color) = self.first_valid_candidate(target) {
                debug!(
                    "backjump to {}: now {}",
                    self.problem.graph().label(target), self.problem.domain().label(color)
                );
                self.state.recolor_tail(color);
                self.stats.nb_commits += 1;
                self.stats.nb_backjumps += 1;
                return Some(target);
            }
            trace!("backjump target {} has no color left", self.problem.graph().label(target));
            self.load_culprits(target);
            self.state.uncommit_tail();
            self.stats.nb_unassigned += 1;
        }
        while self.state.uncommit_tail().is_some() {
            self.stats.nb_unassigned += 1;
        }
        None
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    use crate::color::{checker, CheckerResult, ColorDomain};
    use crate::graph::ConstraintGraph;

    fn problem(n:usize, edges:&[(NodeId,NodeId)], colors:&[&str]) -> Rc<ColoringProblem> {
        Rc::new(ColoringProblem::new(
            ConstraintGraph::from_edges(n, edges, None).unwrap(),
            ColorDomain::from_labels(colors).unwrap(),
        ))
    }

    fn clique(n:usize) -> Vec<(NodeId,NodeId)> {
        let mut res = Vec::new();
        for i in 0..n {
            for j in (i+1)..n { res.push((i,j)); }
        }
        res
    }

    fn cycle(n:usize) -> Vec<(NodeId,NodeId)> {
        (0..n).map(|i| (i, (i+1)%n)).collect()
    }

    /// runs step by step, checking the state invariants after every step
    fn run_checked(solver:&mut BackjumpingSolver) -> SearchStep {
        for _ in 0..1_000_000 {
            let step = solver.step();
            assert!(solver.state().is_consistent());
            match step {
                SearchStep::Solved | SearchStep::Unsatisfiable => return step,
                _ => {}
            }
        }
        panic!("search did not terminate");
    }

    /// exhaustive search (small instances only)
    fn brute_force_colorable(p:&ColoringProblem) -> bool {
        let n = p.graph().nb_nodes();
        let k = p.domain().len();
        let mut colors = vec![0 ; n];
        loop {
            if p.graph().edges().iter().all(|(a,b)| colors[*a] != colors[*b]) {
                return true;
            }
            // next assignment (base k counter)
            let mut i = 0;
            loop {
                if i == n { return false; }
                colors[i] += 1;
                if colors[i] < k { break; }
                colors[i] = 0;
                i += 1;
            }
        }
    }

    #[test]
    fn test_triangle() {
        let p = problem(3, &clique(3), &["R","G","B"]);
        let mut solver = BackjumpingSolver::new(p.clone());
        match solver.solve() {
            SearchOutcome::Satisfiable(coloring) => {
                assert_eq!(coloring, Coloring::new(vec![(0,0),(1,1),(2,2)]));
                assert_eq!(checker(p.graph(), p.domain(), &coloring), CheckerResult::Ok);
            },
            SearchOutcome::Unsatisfiable => panic!("the triangle is 3-colorable"),
        }
        assert_eq!(solver.statistics().nb_backjumps, 0);
    }

    #[test]
    fn test_australia() {
        let p = Rc::new(ColoringProblem::australia().unwrap());
        let mut solver = BackjumpingSolver::new(p.clone());
        let coloring = match solver.solve() {
            SearchOutcome::Satisfiable(coloring) => coloring,
            SearchOutcome::Unsatisfiable => panic!("Australia is 3-colorable"),
        };
        assert_eq!(checker(p.graph(), p.domain(), &coloring), CheckerResult::Ok);
        let report:Vec<(&str,&str)> = coloring.iter()
            .map(|(v,c)| (p.graph().label(*v), p.domain().label(*c)))
            .collect();
        assert_eq!(report, vec![
            ("SA","R"), ("NT","G"), ("Q","B"), ("NSW","G"), ("WA","B"), ("V","B"), ("T","R")
        ]);
        // T is isolated: first color of the domain
        assert_eq!(coloring.color_of(6), Some(0));
        let stats = solver.statistics();
        assert_eq!(stats.nb_candidate_evaluations, 15);
        assert_eq!(stats.nb_commits, 7);
        assert_eq!(stats.nb_backjumps, 0);
        assert_eq!(stats.max_depth, 7);
    }

    #[test]
    fn test_k4_is_rejected() {
        let p = problem(4, &clique(4), &["R","G","B"]);
        let mut solver = BackjumpingSolver::new(p);
        assert_eq!(solver.solve(), SearchOutcome::Unsatisfiable);
        assert_eq!(solver.state().nb_assigned(), 0);
        assert_eq!(solver.state().nb_unassigned(), 4);
        let stats = solver.statistics();
        assert_eq!(stats.nb_failures, 6);
        assert_eq!(stats.nb_backjumps, 5);
        // terminal
        assert_eq!(solver.step(), SearchStep::Unsatisfiable);
    }

    #[test]
    fn test_first_steps_of_k4() {
        let p = problem(4, &clique(4), &["R","G","B"]);
        let mut solver = BackjumpingSolver::new(p);
        assert_eq!(solver.step(), SearchStep::Colored(0, 0));
        assert_eq!(solver.step(), SearchStep::Colored(1, 1));
        assert_eq!(solver.conflicts().entries(), &[0]);
        assert_eq!(solver.step(), SearchStep::Colored(2, 2));
        assert_eq!(solver.conflicts().entries(), &[0,1]);
        // 3 is blocked by 0, 1, 2: node 2 has no color left, 1 moves to B
        assert_eq!(solver.step(), SearchStep::Backjumped { failed:3, target:1 });
        assert_eq!(solver.state().assigned(), &[0,1]);
        assert_eq!(solver.state().color(1), Some(2));
        assert!(solver.state().domain(1).is_empty());
        assert_eq!(solver.state().domain(3), &[0,1,2]);
        assert_eq!(solver.state().domain(2), &[0,1,2]);
        assert_eq!(solver.state().culprits(1).iter().collect::<Vec<_>>(), vec![0]);
        assert!(solver.state().culprits(3).is_empty());
    }

    #[test]
    fn test_exhausted_target_passes_on_its_culprits() {
        // 1 and 3 are colored first, the dead end on 6 sends the search back to 0
        // through 4, whose culprits are 1 and 3
        let edges = [(0,2),(0,5),(0,6),(1,2),(1,3),(1,4),(1,5),(3,4),(3,5),(3,6),(4,6)];
        let p = problem(7, &edges, &["R","G","B"]);
        assert!(brute_force_colorable(&p));
        let mut solver = BackjumpingSolver::new(p.clone());
        for _ in 0..5 {
            assert!(matches!(solver.step(), SearchStep::Colored(..)));
        }
        assert_eq!(solver.state().assigned(), &[1,3,0,4,5]);
        assert_eq!(solver.step(), SearchStep::Backjumped { failed:6, target:0 });
        assert_eq!(solver.state().assigned(), &[1,3,0]);
        assert_eq!(solver.state().color(0), Some(1));
        assert_eq!(solver.state().culprits(0).iter().collect::<Vec<_>>(), vec![1,3]);
        match solver.solve() {
            SearchOutcome::Satisfiable(coloring) => {
                assert_eq!(checker(p.graph(), p.domain(), &coloring), CheckerResult::Ok);
                assert_eq!(coloring.assignment_order(), vec![1,3,0,4,5,6,2]);
            },
            SearchOutcome::Unsatisfiable => panic!("the graph is 3-colorable"),
        }
        assert_eq!(solver.statistics().nb_failures, 1);
    }

    #[test]
    fn test_backjump_then_solution() {
        // hubs 0 and 1 must differ (odd path 0-2-3-1) but are colored first
        let edges = [(0,2),(2,3),(3,1),(0,4),(0,5),(1,6),(1,7)];
        let p = problem(8, &edges, &["R","G"]);
        let mut solver = BackjumpingSolver::new(p.clone());
        assert_eq!(solver.step(), SearchStep::Colored(0, 0));
        assert_eq!(solver.step(), SearchStep::Colored(1, 0));
        assert_eq!(solver.step(), SearchStep::Colored(2, 1));
        assert_eq!(solver.step(), SearchStep::Backjumped { failed:3, target:1 });
        match solver.solve() {
            SearchOutcome::Satisfiable(coloring) => {
                assert_eq!(checker(p.graph(), p.domain(), &coloring), CheckerResult::Ok);
                assert_eq!(coloring.assignment_order(), vec![0,1,2,3,4,5,6,7]);
                assert_eq!(coloring.to_partition(2), vec![vec![0,3,6,7], vec![1,2,4,5]]);
            },
            SearchOutcome::Unsatisfiable => panic!("the graph is bipartite"),
        }
        assert_eq!(solver.statistics().nb_backjumps, 1);
        assert_eq!(solver.statistics().nb_failures, 1);
    }

    #[test]
    fn test_single_color() {
        let p = problem(3, &[], &["R"]);
        assert_eq!(
            BackjumpingSolver::new(p).solve(),
            SearchOutcome::Satisfiable(Coloring::new(vec![(0,0),(1,0),(2,0)]))
        );
        let p = problem(2, &[(0,1)], &["R"]);
        let mut solver = BackjumpingSolver::new(p);
        assert_eq!(solver.solve(), SearchOutcome::Unsatisfiable);
        assert_eq!(solver.state().nb_assigned(), 0);
    }

    #[test]
    fn test_empty_graph() {
        let p = problem(0, &[], &["R"]);
        assert_eq!(
            BackjumpingSolver::new(p).solve(),
            SearchOutcome::Satisfiable(Coloring::new(vec![]))
        );
    }

    #[test]
    fn test_odd_cycles_terminate() {
        for n in [3, 5, 7, 9, 21].iter() {
            let p = problem(*n, &cycle(*n), &["R","G"]);
            let mut solver = BackjumpingSolver::new(p);
            assert_eq!(run_checked(&mut solver), SearchStep::Unsatisfiable);
        }
        // dense cyclic structure: K6 with 5 colors
        let p = problem(6, &clique(6), &["a","b","c","d","e"]);
        let mut solver = BackjumpingSolver::new(p);
        assert_eq!(run_checked(&mut solver), SearchStep::Unsatisfiable);
    }

    #[test]
    fn test_deterministic() {
        let d = ColorDomain::from_labels(&["R","G","B"]).unwrap();
        let p = Rc::new(ColoringProblem::random(25, 0.2, 3, d).unwrap());
        let mut a = BackjumpingSolver::new(p.clone());
        let mut b = BackjumpingSolver::new(p);
        let mut steps_a = Vec::new();
        let mut steps_b = Vec::new();
        loop {
            let s = a.step();
            steps_a.push(s);
            if s == SearchStep::Solved || s == SearchStep::Unsatisfiable { break; }
        }
        loop {
            let s = b.step();
            steps_b.push(s);
            if s == SearchStep::Solved || s == SearchStep::Unsatisfiable { break; }
        }
        assert_eq!(steps_a, steps_b);
        assert_eq!(a.state().coloring(), b.state().coloring());
    }

    #[test]
    fn test_random_instances() {
        let mut rng = StdRng::seed_from_u64(42);
        for seed in 0..60 {
            let n = rng.gen_range(1..9);
            let density = rng.gen_range(0.1..0.9);
            let k = rng.gen_range(1..5);
            let labels:Vec<String> = (0..k).map(|c| c.to_string()).collect();
            let d = ColorDomain::new(labels).unwrap();
            let p = Rc::new(ColoringProblem::random(n, density, seed, d).unwrap());
            let colorable = brute_force_colorable(&p);
            for policy in [ConflictPolicy::KeepDuplicates, ConflictPolicy::KeepMostRecent].iter() {
                let mut solver = BackjumpingSolver::with_policy(p.clone(), *policy);
                let solved = run_checked(&mut solver) == SearchStep::Solved;
                assert_eq!(solved, colorable, "instance {} ({} nodes, {} colors)", seed, n, k);
                if solved {
                    let coloring = solver.state().coloring();
                    assert_eq!(checker(p.graph(), p.domain(), &coloring), CheckerResult::Ok);
                } else {
                    assert!(solver.statistics().nb_failures > 0);
                    assert_eq!(solver.state().nb_assigned(), 0);
                }
                // every candidate evaluation consumes a candidate
                let stats = solver.statistics();
                assert!(stats.nb_commits <= stats.nb_candidate_evaluations);
            }
        }
    }

    #[test]
    fn test_cyclic_graphs_evaluation_bound() {
        for n in [3, 5, 7, 9, 21, 51].iter() {
            let p = problem(*n, &cycle(*n), &["R","G"]);
            let mut solver = BackjumpingSolver::new(p.clone());
            assert_eq!(solver.solve(), SearchOutcome::Unsatisfiable);
            let stats = solver.statistics();
            assert!(stats.nb_backjumps > 0);
            assert!(stats.nb_candidate_evaluations <= 2 * p.graph().nb_nodes() * p.domain().len());
        }
        // even cycles are 2-colorable without any dead end
        let p = problem(20, &cycle(20), &["R","G"]);
        let mut solver = BackjumpingSolver::new(p.clone());
        assert!(matches!(solver.solve(), SearchOutcome::Satisfiable(_)));
        assert!(solver.statistics().nb_candidate_evaluations <= 20 * 2);
        // the hub graph backjumps once
        let edges = [(0,2),(2,3),(3,1),(0,4),(0,5),(1,6),(1,7)];
        let p = problem(8, &edges, &["R","G"]);
        let mut solver = BackjumpingSolver::new(p);
        assert!(matches!(solver.solve(), SearchOutcome::Satisfiable(_)));
        assert_eq!(solver.statistics().nb_candidate_evaluations, 16);
    }

    #[test]
    fn test_no_backjump_bound() {
        // without dead ends, each node evaluates each color at most once
        let d = ColorDomain::from_labels(&["R","G","B","Y"]).unwrap();
        let p = Rc::new(ColoringProblem::random(40, 0.05, 11, d).unwrap());
        let mut solver = BackjumpingSolver::new(p.clone());
        let outcome = solver.solve();
        let stats = solver.statistics();
        if stats.nb_failures == 0 {
            assert!(matches!(outcome, SearchOutcome::Satisfiable(_)));
            assert!(stats.nb_candidate_evaluations <= p.graph().nb_nodes() * p.domain().len());
        }
    }
}
