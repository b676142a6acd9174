//! Headless симуляция FPSGame
//!
//! Стрелок зажимает спуск, манекен в 10m впереди. Лог ammo/health.
//! Опциональный аргумент: путь к combat.toml.

use bevy::prelude::*;
use fpsgame_simulation::*;

fn main() {
    let seed = 42;
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "combat.toml".to_string());

    let config = match CombatConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(err) => {
            log_error(&format!("{}", err));
            std::process::exit(1);
        }
    };

    log_info(&format!(
        "Starting FPSGame headless simulation (seed: {})",
        seed
    ));

    let mut app = create_headless_app(seed);
    app.insert_resource(config.clone()).add_plugins(SimulationPlugin);

    let shooter = app
        .world_mut()
        .spawn((Player, combatant_bundle(Vec3::new(0.0, 1.0, 0.0), config.damage.max_health)))
        .id();
    app.world_mut().spawn(weapon_bundle(shooter, config.weapon.clone()));

    let dummy = app
        .world_mut()
        .spawn(combatant_bundle(Vec3::new(0.0, 1.0, -10.0), config.damage.max_health))
        .id();
    app.world_mut()
        .spawn(environment_bundle(Vec3::new(0.0, 1.0, -20.0), Vec3::new(10.0, 5.0, 0.5)));

    // Запускаем 600 тиков симуляции (10s)
    for tick in 0..600 {
        app.world_mut().send_event(CombatInputEvent {
            entity: shooter,
            fire_pressed: tick == 1,
            fire_held: true,
            ..default()
        });

        app.update();

        if tick % 60 == 0 {
            let hud = *app.world().resource::<PlayerHud>();
            let dummy_health = app.world().get::<Health>(dummy).map(|h| h.current);
            log_info(&format!(
                "Tick {}: ammo {} | dummy HP {:?} | {} entities",
                tick,
                hud.ammo_text().unwrap_or_default(),
                dummy_health,
                app.world().entities().len()
            ));
        }
    }

    log_info("Simulation complete!");
}
