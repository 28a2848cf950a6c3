//! Base-Phase Plan Generator
//!
//! Builds one week of the 8-week base phase from a fixed skeleton:
//! - Mon/Thu/Sun are flat easy runs whose distances flex
//! - Tue/Sat are mountain runs, fixed for the week
//! - Wed/Fri are strength + mobility days
//!
//! Weekly mileage is pulled toward `WEEK_MILEAGE` by a greedy loop that only
//! touches the easy days, in the order Sun -> Thu -> Mon, within per-day clamps.

use serde::Serialize;

use crate::models::plan::{
    DayPlan, Intensity, MobilityBlock, MobilityRoutine, RouteKind, Run, StrengthBlock,
    StrengthRoutine, Strides,
};

pub const PLAN_WEEKS: usize = 8;
pub const DAYS_PER_WEEK: usize = 7;

/// Target total run mileage for each week of the base phase
pub const WEEK_MILEAGE: [f64; PLAN_WEEKS] = [20.0, 22.0, 24.0, 20.0, 26.0, 28.0, 30.0, 24.0];

const STEP_MI: f64 = 0.5;
const TOLERANCE_MI: f64 = 0.1;
const SATURDAY_MOUNTAIN_MI: f64 = 6.0;
const FULL_LOOP_MI: f64 = 6.0;

/// Seven day plans, Monday first
pub type WeekPlan = [DayPlan; DAYS_PER_WEEK];

// ---------------------------------------------------------------------------
/// Week Index: 0-based position inside the base phase
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct WeekIndex(u8);

impl WeekIndex {
    pub fn new(index: usize) -> Option<Self> {
        if index < PLAN_WEEKS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Every week of the phase in order
    pub fn all() -> impl Iterator<Item = WeekIndex> {
        (0..PLAN_WEEKS as u8).map(WeekIndex)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// 1-based week number as shown to the athlete
    pub fn number(self) -> u8 {
        self.0 + 1
    }

    pub fn target_mileage(self) -> f64 {
        WEEK_MILEAGE[self.get()]
    }
}

// ---------------------------------------------------------------------------
/// Easy Days: the three distances the balancer may move
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EasyDay {
    Mon,
    Thu,
    Sun,
}

impl EasyDay {
    /// Priority order for each balancing pass
    pub const ADJUST_ORDER: [EasyDay; 3] = [EasyDay::Sun, EasyDay::Thu, EasyDay::Mon];

    /// Upper bound an increase may not start at or above
    pub fn cap(self) -> f64 {
        match self {
            EasyDay::Mon => 6.0,
            EasyDay::Thu => 7.0,
            EasyDay::Sun => 7.5,
        }
    }

    /// Lower bound a decrease may not start at or below
    pub fn floor(self) -> f64 {
        match self {
            EasyDay::Mon => 3.0,
            EasyDay::Thu => 3.5,
            EasyDay::Sun => 2.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EasyDistances {
    pub mon: f64,
    pub thu: f64,
    pub sun: f64,
}

impl EasyDistances {
    /// Week-dependent starting distances before balancing
    pub fn baseline(week: WeekIndex) -> Self {
        let w = week.get();
        let mon = if w >= 4 { 5.0 } else { 4.0 };
        let thu = if w >= 6 {
            6.0
        } else if w >= 4 {
            5.0
        } else {
            4.5
        };
        let sun = if w >= 6 {
            7.0
        } else if w >= 5 {
            6.0
        } else {
            3.0
        };
        Self { mon, thu, sun }
    }

    pub fn total(&self) -> f64 {
        self.mon + self.thu + self.sun
    }

    fn slot_mut(&mut self, day: EasyDay) -> &mut f64 {
        match day {
            EasyDay::Mon => &mut self.mon,
            EasyDay::Thu => &mut self.thu,
            EasyDay::Sun => &mut self.sun,
        }
    }
}

/// Fixed mountain distances for a week (never touched by the balancer)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MountainDistances {
    pub tue: f64,
    pub sat: f64,
}

impl MountainDistances {
    pub fn for_week(week: WeekIndex) -> Self {
        let tue = match week.get() {
            0 => 3.5,
            1 => 4.5,
            3 => 3.5,
            7 => 4.0,
            _ => 6.0,
        };
        Self {
            tue,
            sat: SATURDAY_MOUNTAIN_MI,
        }
    }

    pub fn total(&self) -> f64 {
        self.tue + self.sat
    }
}

// ---------------------------------------------------------------------------
/// Mileage Balancing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceOutcome {
    pub easy: EasyDistances,
    /// target - achieved, rounded to one decimal
    pub residual: f64,
    /// false when the loop stopped because no easy day could move
    pub converged: bool,
    pub passes: u32,
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Move the easy days in 0.5 mi steps until the weekly total is within
/// 0.1 mi of `target`, or until a full pass moves nothing.
///
/// The running diff is updated in place as each day moves, so a pass can
/// overshoot and then correct itself with the next day in the order.
///
/// `target - start total` must sit on the 0.5 mi grid. Off the grid a day
/// swings by a step every pass and the loop never exits. Every
/// `WEEK_MILEAGE` target satisfies this against its baseline.
pub(crate) fn balance_mileage(
    target: f64,
    mountains: MountainDistances,
    start: EasyDistances,
) -> BalanceOutcome {
    let mut easy = start;
    let mut diff = round_tenth(target - (easy.total() + mountains.total()));
    let mut passes = 0;
    let mut converged = true;

    while diff.abs() >= TOLERANCE_MI {
        let mut moved = false;

        for day in EasyDay::ADJUST_ORDER {
            if diff.abs() < TOLERANCE_MI {
                break;
            }
            let value = easy.slot_mut(day);
            if diff > 0.0 {
                if *value < day.cap() {
                    *value += STEP_MI;
                    diff -= STEP_MI;
                    moved = true;
                }
            } else if *value > day.floor() {
                *value -= STEP_MI;
                diff += STEP_MI;
                moved = true;
            }
        }

        passes += 1;
        diff = round_tenth(target - (easy.total() + mountains.total()));

        if !moved {
            converged = diff.abs() < TOLERANCE_MI;
            break;
        }
    }

    BalanceOutcome {
        easy,
        residual: diff,
        converged,
        passes,
    }
}

// ---------------------------------------------------------------------------
/// Supplements and Routine Details
// ---------------------------------------------------------------------------

pub fn supplements(strength_day: bool) -> Vec<String> {
    let mut list = vec![
        "Creatine 5g".to_string(),
        "Vitamin D3 (2,000–4,000 IU)".to_string(),
        "Magnesium glycinate (300–400mg night)".to_string(),
    ];
    if strength_day {
        list.push("Collagen 15g + Vitamin C (30–60 min pre-strength)".to_string());
    }
    list
}

pub fn strength_routine_details(routine: StrengthRoutine) -> Vec<String> {
    let items: &[&str] = match routine {
        StrengthRoutine::A => &[
            "Trap bar or barbell deadlift 4×5 (heavy, clean form)",
            "Rear-foot elevated split squat 3×6/leg (slow)",
            "Standing calf raise 4×8 (heavy)",
            "Bent-knee calf raise 3×10",
            "Farmer’s carries 4×40s",
        ],
        StrengthRoutine::B => &[
            "Step-downs 3×8/leg (slow eccentric)",
            "Single-leg RDL 3×6/leg",
            "Spanish squat 3×30–45s holds",
            "Hip abduction 3×12",
            "Foot intrinsics 5 min",
        ],
    };
    items.iter().map(|s| s.to_string()).collect()
}

pub fn mobility_routine_details(routine: MobilityRoutine) -> Vec<String> {
    let items: &[&str] = match routine {
        MobilityRoutine::AnkleHip => &[
            "Knee-to-wall ankle mobs 2×10/side",
            "Couch stretch 2×60s/side",
            "Cossack squats 2×6/side",
            "Foot rolling 2–3 min",
        ],
        MobilityRoutine::PostMountain => &[
            "Calf roll 2 min/side",
            "Soleus stretch 2×45s/side",
            "Ankle circles 2×10/side",
            "Toe yoga 2 min",
        ],
        MobilityRoutine::FullReset => &[
            "Knee-to-wall ankle mobs 2×10/side",
            "Couch stretch 2×60s/side",
            "Open books (T-spine) 2×8/side",
            "Glute bridge 2×10",
            "Foot rolling 3 min",
        ],
    };
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
/// Week Builder
// ---------------------------------------------------------------------------

fn flat_run(title: &str, distance_mi: f64, notes: &str) -> Run {
    Run {
        title: title.to_string(),
        distance_mi,
        route: RouteKind::Flat,
        intensity: Intensity::Z2,
        notes: notes.to_string(),
        strides: None,
    }
}

fn mountain_run(title: &str, distance_mi: f64, notes: &str) -> Run {
    Run {
        title: title.to_string(),
        distance_mi,
        route: RouteKind::MountainLoop,
        intensity: Intensity::Z2,
        notes: notes.to_string(),
        strides: None,
    }
}

fn strength(title: &str, routine: StrengthRoutine, duration_min: u32) -> StrengthBlock {
    StrengthBlock {
        title: title.to_string(),
        routine,
        duration_min,
    }
}

fn mobility(title: &str, routine: MobilityRoutine, duration_min: u32) -> MobilityBlock {
    MobilityBlock {
        title: title.to_string(),
        routine,
        duration_min,
    }
}

fn run_day(run: Run, mobility: Option<MobilityBlock>, cue: &str) -> DayPlan {
    DayPlan {
        run: Some(run),
        strength: None,
        mobility,
        supplements: supplements(false),
        cue: cue.to_string(),
    }
}

fn strength_day(strength: StrengthBlock, mobility: MobilityBlock, cue: &str) -> DayPlan {
    DayPlan {
        run: None,
        strength: Some(strength),
        mobility: Some(mobility),
        supplements: supplements(true),
        cue: cue.to_string(),
    }
}

/// Build the seven day plans for `week`, Monday first.
pub fn build_week(week: WeekIndex) -> WeekPlan {
    let mountains = MountainDistances::for_week(week);
    let balanced = balance_mileage(
        week.target_mileage(),
        mountains,
        EasyDistances::baseline(week),
    );
    let EasyDistances { mon, thu, sun } = balanced.easy;

    let tuesday = if mountains.tue >= FULL_LOOP_MI {
        mountain_run(
            "Mountain Loop (Z2)",
            mountains.tue,
            "Full loop. Hike steep sections. Descend under control (short stride, quick feet).",
        )
    } else {
        mountain_run(
            "Mountain Out-and-Back (partial, Z2)",
            mountains.tue,
            "Go up, turn around early. Hike steep. Descend slower than you want.",
        )
    };

    let mut thursday = flat_run(
        "Easy Run + Strides",
        thu,
        "After the run: 6 × 20s strides (fast-but-relaxed), full walk recovery.",
    );
    thursday.strides = Some(Strides {
        reps: 6,
        seconds: 20,
    });

    [
        run_day(
            flat_run(
                "Easy Run (Z2)",
                mon,
                "Keep it embarrassingly easy. Smooth cadence. Nose-breath if you can.",
            ),
            Some(mobility("Ankles + Hips Reset", MobilityRoutine::AnkleHip, 20)),
            "Relax your shoulders. Run tall. Quiet feet.",
        ),
        run_day(
            tuesday,
            None,
            "Downhill: avoid braking. Short steps, higher cadence.",
        ),
        strength_day(
            strength("Strength A (Heavy + bone loading)", StrengthRoutine::A, 55),
            mobility(
                "Post-Mountain Calves + Ankles",
                MobilityRoutine::PostMountain,
                15,
            ),
            "Heavy & controlled. Leave 1–2 reps in the tank.",
        ),
        run_day(thursday, None, "Strides are form practice, not a workout."),
        strength_day(
            strength(
                "Strength B (Single-leg + knee/ankle armor)",
                StrengthRoutine::B,
                50,
            ),
            mobility(
                "Full Reset (hips + ankles + T-spine)",
                MobilityRoutine::FullReset,
                20,
            ),
            "Slow eccentrics. Stable knee tracking over toes.",
        ),
        run_day(
            mountain_run(
                "Mountain Loop (Time on feet, Z2)",
                mountains.sat,
                "Full loop. Hike steep. Descend with discipline. If form breaks, hike down.",
            ),
            None,
            "Strong hikers win ultras. Make hiking your superpower.",
        ),
        run_day(
            flat_run(
                "Easy Run (Z1–Z2)",
                sun,
                "Keep this truly easy. If joints feel tender, replace with a 45–60 min walk.",
            ),
            None,
            "Finish feeling better than you started.",
        ),
    ]
}

/// Sum of all run distances in a week
pub fn week_run_mileage(week: &WeekPlan) -> f64 {
    week.iter()
        .filter_map(|d| d.run.as_ref())
        .map(|r| r.distance_mi)
        .sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn week(i: usize) -> WeekIndex {
        WeekIndex::new(i).unwrap()
    }

    fn run_distance(plan: &WeekPlan, day: usize) -> f64 {
        plan[day].run.as_ref().map(|r| r.distance_mi).unwrap()
    }

    #[test]
    fn test_week_index_bounds() {
        assert!(WeekIndex::new(0).is_some());
        assert!(WeekIndex::new(7).is_some());
        assert!(WeekIndex::new(8).is_none());
        assert_eq!(WeekIndex::all().count(), PLAN_WEEKS);
        assert_eq!(week(3).number(), 4);
    }

    #[test]
    fn test_every_week_has_seven_days() {
        for w in WeekIndex::all() {
            assert_eq!(build_week(w).len(), DAYS_PER_WEEK);
        }
    }

    #[test]
    fn test_every_week_hits_target_mileage() {
        for w in WeekIndex::all() {
            let plan = build_week(w);
            let total = week_run_mileage(&plan);
            assert!(
                (total - w.target_mileage()).abs() < 0.1,
                "week {} total {} target {}",
                w.get(),
                total,
                w.target_mileage()
            );
        }
    }

    #[test]
    fn test_every_week_converges() {
        for w in WeekIndex::all() {
            let outcome = balance_mileage(
                w.target_mileage(),
                MountainDistances::for_week(w),
                EasyDistances::baseline(w),
            );
            assert!(outcome.converged, "week {} did not converge", w.get());
            assert_eq!(outcome.residual, 0.0);
        }
    }

    #[test]
    fn test_balanced_distances_table() {
        // (mon, tue, thu, sat, sun)
        let expected = [
            (4.0, 3.5, 4.0, 6.0, 2.5),
            (4.0, 4.5, 4.5, 6.0, 3.0),
            (4.0, 6.0, 4.5, 6.0, 3.5),
            (4.0, 3.5, 4.0, 6.0, 2.5),
            (5.0, 6.0, 5.5, 6.0, 3.5),
            (5.0, 6.0, 5.0, 6.0, 6.0),
            (5.0, 6.0, 6.0, 6.0, 7.0),
            (4.0, 4.0, 4.5, 6.0, 5.5),
        ];
        for (i, (mon, tue, thu, sat, sun)) in expected.into_iter().enumerate() {
            let plan = build_week(week(i));
            assert_eq!(run_distance(&plan, 0), mon, "week {} mon", i);
            assert_eq!(run_distance(&plan, 1), tue, "week {} tue", i);
            assert_eq!(run_distance(&plan, 3), thu, "week {} thu", i);
            assert_eq!(run_distance(&plan, 5), sat, "week {} sat", i);
            assert_eq!(run_distance(&plan, 6), sun, "week {} sun", i);
        }
    }

    #[test]
    fn test_mountain_days_never_adjusted() {
        for w in WeekIndex::all() {
            let plan = build_week(w);
            let mountains = MountainDistances::for_week(w);
            assert_eq!(run_distance(&plan, 1), mountains.tue);
            assert_eq!(run_distance(&plan, 5), 6.0);
        }
    }

    #[test]
    fn test_strength_days_have_no_run() {
        for w in WeekIndex::all() {
            let plan = build_week(w);
            assert!(plan[2].run.is_none());
            assert!(plan[4].run.is_none());
            assert_eq!(plan[2].strength.as_ref().unwrap().routine, StrengthRoutine::A);
            assert_eq!(plan[4].strength.as_ref().unwrap().routine, StrengthRoutine::B);
        }
    }

    #[test]
    fn test_tuesday_title_follows_distance() {
        let short = build_week(week(0));
        assert_eq!(
            short[1].run.as_ref().unwrap().title,
            "Mountain Out-and-Back (partial, Z2)"
        );
        let full = build_week(week(2));
        assert_eq!(full[1].run.as_ref().unwrap().title, "Mountain Loop (Z2)");
    }

    #[test]
    fn test_thursday_has_strides() {
        let plan = build_week(week(5));
        let strides = plan[3].run.as_ref().unwrap().strides.unwrap();
        assert_eq!(strides, Strides { reps: 6, seconds: 20 });
        assert!(plan[0].run.as_ref().unwrap().strides.is_none());
    }

    #[test]
    fn test_supplements_by_day_kind() {
        let plan = build_week(week(1));
        for (day, entry) in plan.iter().enumerate() {
            let expected = if entry.strength.is_some() { 4 } else { 3 };
            assert_eq!(entry.supplements.len(), expected, "day {}", day);
        }
        assert!(plan[2].supplements[3].starts_with("Collagen"));
    }

    #[test]
    fn test_routine_details_are_non_empty_and_stable() {
        for routine in [StrengthRoutine::A, StrengthRoutine::B] {
            let details = strength_routine_details(routine);
            assert!(!details.is_empty());
            assert_eq!(details, strength_routine_details(routine));
        }
        for routine in [
            MobilityRoutine::AnkleHip,
            MobilityRoutine::PostMountain,
            MobilityRoutine::FullReset,
        ] {
            let details = mobility_routine_details(routine);
            assert!(!details.is_empty());
            assert_eq!(details, mobility_routine_details(routine));
        }
        assert_eq!(strength_routine_details(StrengthRoutine::A).len(), 5);
        assert_eq!(mobility_routine_details(MobilityRoutine::PostMountain).len(), 4);
    }

    #[test]
    fn test_balancer_stops_at_clamps() {
        // Target far above what the caps allow: mon 6.0 + thu 7.0 + sun 7.5
        let mountains = MountainDistances { tue: 6.0, sat: 6.0 };
        let outcome = balance_mileage(60.0, mountains, EasyDistances::baseline(week(0)));
        assert!(!outcome.converged);
        assert_eq!(outcome.easy, EasyDistances { mon: 6.0, thu: 7.0, sun: 7.5 });
        assert_eq!(outcome.residual, 27.5);
    }

    #[test]
    fn test_balancer_stops_at_floors() {
        let mountains = MountainDistances { tue: 6.0, sat: 6.0 };
        let outcome = balance_mileage(10.0, mountains, EasyDistances::baseline(week(0)));
        assert!(!outcome.converged);
        assert_eq!(outcome.easy, EasyDistances { mon: 3.0, thu: 3.5, sun: 2.5 });
        assert_eq!(outcome.residual, -11.0);
    }

    #[test]
    fn test_balancer_noop_when_on_target() {
        let w = week(1);
        let outcome = balance_mileage(
            w.target_mileage(),
            MountainDistances::for_week(w),
            EasyDistances::baseline(w),
        );
        assert_eq!(outcome.passes, 0);
        assert_eq!(outcome.easy, EasyDistances::baseline(w));
    }

    #[test]
    fn test_week_targets_sit_on_half_mile_grid() {
        for w in WeekIndex::all() {
            let gap = w.target_mileage()
                - (EasyDistances::baseline(w).total() + MountainDistances::for_week(w).total());
            let steps = gap / STEP_MI;
            assert!((steps - steps.round()).abs() < 1e-9, "week {} gap {}", w.get(), gap);
        }
    }

    #[test]
    fn test_payload_serializes_route_and_routine_ids() {
        let plan = build_week(week(0));
        let json = serde_json::to_value(&plan[1]).unwrap();
        assert_eq!(json["run"]["route"], "mountain_loop");
        assert_eq!(json["run"]["intensity"], "Z2");
        assert!(json.get("strength").is_none());

        let json = serde_json::to_value(&plan[4]).unwrap();
        assert_eq!(json["strength"]["routine"], "B");
        assert_eq!(json["mobility"]["routine"], "full_reset");
    }
}
