//! Helio shell: a line-oriented stand-in for the dashboard tabs.

mod session;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use helio_assistant::{ChatRouter, GeminiClient};
use helio_core::{AppError, Config};
use helio_solar::PortalClient;
use helio_weather::{Place, PlaceRegistry, WeatherService};

use crate::session::{Role, SessionContext};

const HELP: &str = "\
Comandos:
  /lugares              lista os lugares cadastrados
  /add <cidade, país>   adiciona um lugar por geocodificação
  /rm <n>               remove o lugar n
  /sel <n>              seleciona o lugar n
  /previsao             consulta a previsão do lugar selecionado
  /login <conta> <senha> entra no portal solar e lista as plantas
  /plantas              lista as plantas da conta
  /planta <id>          carrega o resumo de uma planta
  /logout [tudo]        encerra a sessão do portal
  /sair                 sai
Qualquer outro texto vai para o assistente.";

struct Shell {
    weather: WeatherService,
    portal: PortalClient,
    router: ChatRouter,
    session: SessionContext,
}

#[tokio::main]
async fn main() -> Result<()> {
    helio_core::init()?;

    let (config, _validation) = match Config::load_validated() {
        Ok(loaded) => loaded,
        Err(e) => {
            let err = AppError::from(e);
            tracing::error!("Startup aborted: {}", err);
            eprintln!("{}", err.user_message());
            return Ok(());
        }
    };
    tracing::info!("Helio shell started");

    let weather =
        WeatherService::with_base_urls(&config.weather.geocode_url, &config.weather.forecast_url);
    let portal = PortalClient::new(&config.solar.region);
    let llm = config
        .assistant
        .api_key
        .as_deref()
        .map(|key| GeminiClient::new(key, Some(&config.assistant.model)));

    let mut registry = PlaceRegistry::new();
    registry.add(Place::new(
        config.weather.default_place.clone(),
        config.weather.default_latitude,
        config.weather.default_longitude,
        config.weather.default_timezone.clone(),
    ));

    let mut session = SessionContext::new(registry);
    if let Some(account) = &config.solar.account {
        session.account = account.clone();
    }
    if let Some(password) = &config.solar.password {
        session.password = password.clone();
    }

    let mut shell = Shell {
        router: ChatRouter::new(weather.clone(), llm),
        weather,
        portal,
        session,
    };

    println!("Helio — painel pessoal (clima + solar + assistente)");
    println!("{}", HELP);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/sair" {
            break;
        }
        shell.dispatch(line).await;
    }

    tracing::info!("Helio shell finished");
    Ok(())
}

impl Shell {
    async fn dispatch(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix("/add ") {
            self.add_place(rest).await;
        } else if line == "/lugares" {
            self.list_places();
        } else if let Some(rest) = line.strip_prefix("/rm ") {
            self.remove_place(rest);
        } else if let Some(rest) = line.strip_prefix("/sel ") {
            self.select_place(rest);
        } else if line == "/previsao" {
            self.show_forecast().await;
        } else if let Some(rest) = line.strip_prefix("/login ") {
            self.login(rest).await;
        } else if line == "/plantas" {
            self.list_plants().await;
        } else if let Some(rest) = line.strip_prefix("/planta ") {
            self.show_plant(rest).await;
        } else if line == "/logout" || line == "/logout tudo" {
            self.session.logout(line.ends_with("tudo"));
            println!("Sessão finalizada.");
        } else if line.starts_with('/') {
            println!("{}", HELP);
        } else {
            self.chat(line).await;
        }
    }

    async fn add_place(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            println!("Digite cidade e país, ex.: 'Paris, França'.");
            return;
        }
        match self.weather.geocode(query).await {
            Some(place) => {
                let name = place.name.clone();
                if self.session.places.add(place) {
                    println!("'{}' adicionado.", name);
                } else {
                    println!("Lugar já cadastrado.");
                }
            }
            None => println!("Local não encontrado. Tente outro nome."),
        }
    }

    fn list_places(&self) {
        if self.session.places.is_empty() {
            println!("Nenhum lugar cadastrado ainda.");
            return;
        }
        for (i, place) in self.session.places.iter().enumerate() {
            let marker = if i == self.session.selected { '*' } else { ' ' };
            println!(
                "{} {}: {} ({:.3}, {:.3}) [{}]",
                marker, i, place.name, place.latitude, place.longitude, place.timezone
            );
        }
    }

    fn remove_place(&mut self, arg: &str) {
        match arg.trim().parse::<usize>() {
            Ok(index) => match self.session.places.remove(index) {
                Some(place) => {
                    println!("Removido: {}", place.name);
                    self.session.tables = None;
                    self.session.selected = 0;
                }
                None => println!("Índice inválido."),
            },
            Err(_) => println!("Uso: /rm <n>"),
        }
    }

    fn select_place(&mut self, arg: &str) {
        match arg.trim().parse::<usize>() {
            Ok(index) if index < self.session.places.len() => {
                self.session.selected = index;
                self.list_places();
            }
            _ => println!("Índice inválido."),
        }
    }

    async fn show_forecast(&mut self) {
        let Some(place) = self.session.places.get(self.session.selected).cloned() else {
            println!("Nenhum lugar cadastrado ainda.");
            return;
        };

        match self.weather.forecast_tables(&place).await {
            Some(tables) => {
                println!("{} — ({:.3}, {:.3})", place.name, place.latitude, place.longitude);

                let summary = tables.today_summary();
                let fmt = |v: Option<f64>| {
                    v.map(|x| format!("{:.1}", x)).unwrap_or_else(|| "—".to_string())
                };
                println!(
                    "Hoje: mín {} °C · máx {} °C · chuva {} mm",
                    fmt(summary.temp_min),
                    fmt(summary.temp_max),
                    fmt(summary.precipitation),
                );

                println!("Próximas 24h (hora local):");
                for row in &tables.hourly_today {
                    println!(
                        "  {}  {} °C  {} mm",
                        row.time.format("%H:%M"),
                        fmt(row.temperature),
                        fmt(row.precipitation),
                    );
                }

                println!("Próximos dias:");
                for row in &tables.daily {
                    println!(
                        "  {}  {}–{} °C  {} mm",
                        row.date.format("%d/%m"),
                        fmt(row.temp_min),
                        fmt(row.temp_max),
                        fmt(row.precipitation_sum),
                    );
                }

                self.session.tables = Some(tables);
            }
            None => println!("Não foi possível obter a previsão agora."),
        }
    }

    async fn login(&mut self, rest: &str) {
        let mut parts = rest.split_whitespace();
        let (Some(account), Some(password)) = (parts.next(), parts.next()) else {
            println!("Uso: /login <conta> <senha>");
            return;
        };
        self.session.account = account.to_string();
        self.session.password = password.to_string();
        self.list_plants().await;
    }

    async fn list_plants(&mut self) {
        if self.session.account.is_empty() {
            println!("Use /login <conta> <senha> primeiro.");
            return;
        }
        match self
            .portal
            .list_plants(&self.session.account, &self.session.password)
            .await
        {
            Ok((plants, token)) => {
                self.session.token = Some(token);
                if plants.is_empty() {
                    println!("Nenhuma planta encontrada para esta conta.");
                } else {
                    for plant in &plants {
                        match plant.capacity {
                            Some(cap) => {
                                println!("{}  {} ({:.1} kW)", plant.id, plant.name, cap)
                            }
                            None => println!("{}  {}", plant.id, plant.name),
                        }
                    }
                }
                self.session.plants = plants;
            }
            Err(e) => {
                tracing::error!("Plant listing failed: {}", e);
                println!("{}", e.user_message());
            }
        }
    }

    async fn show_plant(&mut self, plant_id: &str) {
        if self.session.account.is_empty() {
            println!("Use /login <conta> <senha> primeiro.");
            return;
        }
        match self
            .portal
            .load_collated(&self.session.account, &self.session.password, plant_id.trim())
            .await
        {
            Ok((snapshot, token)) => {
                self.session.token = Some(token);

                let fmt = |v: Option<f64>| {
                    v.map(|x| format!("{:.1}", x)).unwrap_or_else(|| "—".to_string())
                };
                println!(
                    "{} [{}]",
                    snapshot.name.as_deref().unwrap_or("planta"),
                    snapshot.model.as_deref().unwrap_or("?"),
                );
                println!(
                    "  Capacidade: {} kW · Bateria: {} kWh",
                    fmt(snapshot.capacity),
                    fmt(snapshot.battery_capacity),
                );
                println!(
                    "  Geração: agora {} kW · hoje {} kWh · mês {} kWh · total {} kWh",
                    fmt(snapshot.generation_live),
                    fmt(snapshot.generation_today),
                    fmt(snapshot.month_generation),
                    fmt(snapshot.all_time_generation),
                );
                println!(
                    "  Fluxos: casa {} kW · rede {} kW · bateria {} kW (SoC {}%)",
                    fmt(snapshot.house_load),
                    fmt(snapshot.grid_load),
                    fmt(snapshot.battery),
                    fmt(snapshot.soc),
                );
                for inverter in &snapshot.inverters {
                    println!(
                        "  Inversor {}: {} ({} °C)",
                        inverter.serial.as_deref().unwrap_or("?"),
                        inverter.model.as_deref().unwrap_or("?"),
                        fmt(inverter.internal_temp),
                    );
                }

                self.session.snapshot = Some(snapshot);
            }
            Err(e) => {
                tracing::error!("Plant snapshot failed: {}", e);
                println!("{}", e.user_message());
            }
        }
    }

    async fn chat(&mut self, message: &str) {
        self.session.push_message(Role::User, message);
        let answer = self.router.route(message, &self.session.places).await;
        println!("{}", answer);
        self.session.push_message(Role::Assistant, answer);
    }
}
