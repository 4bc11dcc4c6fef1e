use carevo::logging::{EvolutionLogger, AVG_FITNESS, MAX_FITNESS};
use carevo::{Population, PopulationConfig, ScoredAgent};
use carevo_nn::networks::{Network, SPEED_INPUT_COUNT};

use std::error::Error;
use std::f32::consts::TAU;
use std::fs;
use std::sync::{Arc, Mutex, MutexGuard};

use log::info;
use rayon::prelude::*;

const TIME_STEP: f32 = 0.1;
const STEPS: usize = 600;
const MAX_SPEED: f32 = 10.0;
const ACCELERATION: f32 = 4.0;
// Radians per second at full lock.
const MAX_TURN_RATE: f32 = 1.5;
const SENSOR_RANGE: f32 = 20.0;
const SENSOR_FAN: f32 = 2.0;
const RAY_STEP: f32 = 0.25;

/// Curriculum: a gentle road, then a twisty one.
const STAGES: [Track; 2] = [
    Track {
        amplitude: 2.0,
        wavelength: 80.0,
        half_width: 4.0,
    },
    Track {
        amplitude: 8.0,
        wavelength: 60.0,
        half_width: 3.0,
    },
];

/// A sinusoidal road of constant width
/// running along the x axis.
#[derive(Clone, Copy, Debug)]
struct Track {
    amplitude: f32,
    wavelength: f32,
    half_width: f32,
}

#[derive(Clone, Copy, Debug)]
struct Car {
    x: f32,
    y: f32,
    heading: f32,
    speed: f32,
}

impl Car {
    fn step(&mut self, steering: f32, throttle: f32) {
        self.heading += steering.clamp(-1.0, 1.0) * MAX_TURN_RATE * TIME_STEP;
        let accelerated = self.speed + throttle.clamp(-1.0, 1.0) * ACCELERATION * TIME_STEP;
        self.speed = accelerated.clamp(0.0, MAX_SPEED);
        self.x += self.speed * self.heading.cos() * TIME_STEP;
        self.y += self.speed * self.heading.sin() * TIME_STEP;
    }
}

impl Track {
    fn center(&self, x: f32) -> f32 {
        self.amplitude * (x * TAU / self.wavelength).sin()
    }

    fn on_road(&self, x: f32, y: f32) -> bool {
        (y - self.center(x)).abs() <= self.half_width
    }

    /// Normalized free distance along `angle`.
    fn sense(&self, car: &Car, angle: f32) -> f32 {
        let (dx, dy) = (angle.cos(), angle.sin());
        let mut distance = 0.0;
        while distance < SENSOR_RANGE && self.on_road(car.x + dx * distance, car.y + dy * distance)
        {
            distance += RAY_STEP;
        }
        distance.min(SENSOR_RANGE) / SENSOR_RANGE
    }

    /// Runs one episode and returns the distance covered along the
    /// road, plus 1 so that every fitness is positive. The episode
    /// ends when the car leaves the road or time runs out.
    fn drive(&self, network: &Network) -> f32 {
        let sensor_count = network.input_count() - SPEED_INPUT_COUNT;
        let slope = self.amplitude * TAU / self.wavelength;
        let mut car = Car {
            x: 0.0,
            y: 0.0,
            heading: slope.atan(),
            speed: 0.0,
        };

        let mut inputs = vec![0.0; network.input_count()];
        for _ in 0..STEPS {
            inputs[0] = car.speed / MAX_SPEED;
            for (i, input) in inputs[SPEED_INPUT_COUNT..].iter_mut().enumerate() {
                *input = self.sense(&car, car.heading + sensor_angle(i, sensor_count));
            }
            let controls = match network.evaluate(&inputs) {
                Ok(controls) => controls,
                Err(_) => break,
            };
            car.step(controls[0], controls[1]);
            if !self.on_road(car.x, car.y) {
                break;
            }
        }
        1.0 + car.x.max(0.0)
    }
}

/// Sensors are spread evenly across the fan,
/// with a single sensor pointing straight ahead.
fn sensor_angle(index: usize, count: usize) -> f32 {
    if count <= 1 {
        0.0
    } else {
        -SENSOR_FAN / 2.0 + SENSOR_FAN * index as f32 / (count - 1) as f32
    }
}

fn load_config(path: &str) -> Result<PopulationConfig, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    Ok(ron::from_str(&text)?)
}

fn lock(logger: &Mutex<EvolutionLogger>) -> MutexGuard<'_, EvolutionLogger> {
    match logger.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => PopulationConfig::default(),
    };
    let logger = Arc::new(Mutex::new(EvolutionLogger::new()));
    let mut population = Population::new(config)?;
    population.set_recorder(Box::new(Arc::clone(&logger)));
    population.initialize();

    let mut champion: Option<ScoredAgent> = None;
    for (stage, track) in STAGES.iter().enumerate() {
        population.reset_generation_counter();
        while !population.is_generation_limit_reached() {
            let agents: Vec<ScoredAgent> = population
                .networks()
                .par_iter()
                .map(|network| ScoredAgent::new(Arc::clone(network), track.drive(network)))
                .collect();

            if let Some(best) = agents
                .iter()
                .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
            {
                if champion.as_ref().map_or(true, |c| best.fitness > c.fitness) {
                    champion = Some(best.clone());
                }
            }

            population.advance_generation(&agents)?;
            let logger = lock(&logger);
            info!(
                "stage {} generation {}: max {:?}, mean {:?}",
                stage + 1,
                population.generation(),
                logger.latest(MAX_FITNESS),
                logger.latest(AVG_FITNESS),
            );
        }

        let mut logger = lock(&logger);
        println!("Stage {} summary: {}", stage + 1, logger);
        logger.clear();
    }

    if let Some(champion) = champion {
        println!(
            "Champion ({} inputs, {} hidden, fitness {}): {}",
            champion.network.input_count(),
            champion.network.hidden_count(),
            champion.fitness,
            ron::to_string(&champion.network.to_genome())?,
        );
    }
    Ok(())
}
