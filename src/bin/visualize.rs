use macroquad::prelude::*;
use cookie_shelf::{
    AppContext, DisplayMode, ElementTable, PointerEvent, StorefrontConfig, TransitionTile,
    Router, ViewportSize, NAV_LINKS, SHELF_THICKNESS_PX,
};

const NAV_KEYS: [KeyCode; 4] = [KeyCode::Key1, KeyCode::Key2, KeyCode::Key3, KeyCode::Key4];
const COOKIE_COLOR: Color = Color::new(0.78, 0.55, 0.32, 1.0);
const CHIP_COLOR: Color = Color::new(0.30, 0.18, 0.10, 1.0);
const SHELF_COLOR: Color = Color::new(0.55, 0.38, 0.25, 1.0);
const TILE_COLOR: Color = Color::new(0.96, 0.45, 0.40, 1.0);

#[macroquad::main("Cookie shelf")]
async fn main() {
    tracing_subscriber::fmt::init();
    request_new_screen_size(1280.0, 800.0);
    next_frame().await;

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("bad config, using defaults: {err}");
            StorefrontConfig::default()
        }
    };
    let mut viewport = ViewportSize::new(screen_width(), screen_height());
    let mut ctx = match AppContext::from_config(config, viewport) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("failed to start storefront: {err}");
            return;
        }
    };
    let mut elements = ElementTable::new();
    let mut last_mouse = mouse_position();

    loop {
        let size = ViewportSize::new(screen_width(), screen_height());
        if size != viewport {
            viewport = size;
            ctx.resize(size);
        }

        handle_pointer(&ctx, &mut last_mouse);
        handle_keys(&mut ctx);

        ctx.frame(get_frame_time(), &mut elements);

        clear_background(Color::from_rgba(253, 246, 236, 255));
        match ctx.display().mode() {
            DisplayMode::Shelf => draw_shelf(&ctx, &elements),
            DisplayMode::Grid => draw_grid(&ctx),
        }
        draw_nav(&ctx);
        draw_cart(&ctx);
        draw_transition(ctx.transitions().tiles(), ctx.transitions().grid());
        draw_help();

        next_frame().await;
    }
}

fn handle_pointer(ctx: &AppContext, last_mouse: &mut (f32, f32)) {
    let (x, y) = mouse_position();
    let pointer = ctx.pointer();
    if is_mouse_button_pressed(MouseButton::Left) {
        pointer.dispatch(PointerEvent::Down { x, y });
    } else if (x, y) != *last_mouse {
        pointer.dispatch(PointerEvent::Move { x, y });
    }
    if is_mouse_button_released(MouseButton::Left) {
        pointer.dispatch(PointerEvent::Up);
    }
    *last_mouse = (x, y);
}

fn handle_keys(ctx: &mut AppContext) {
    if is_key_pressed(KeyCode::P) {
        let enabled = !ctx.display().physics_enabled();
        ctx.display_mut().toggle_physics(enabled);
    }
    if is_key_pressed(KeyCode::S) {
        ctx.display_mut().scatter();
    }
    if is_key_pressed(KeyCode::O) {
        ctx.display_mut().self_organize();
    }
    if is_key_pressed(KeyCode::G) {
        ctx.toggle_layout();
    }
    if is_key_pressed(KeyCode::A) || is_mouse_button_pressed(MouseButton::Right) {
        let (x, y) = mouse_position();
        ctx.select_at(x, y);
    }
    if is_key_pressed(KeyCode::C) {
        let open = !ctx.cart().is_open();
        ctx.cart_mut().set_open(open);
    }
    if is_key_pressed(KeyCode::X) {
        ctx.cart_mut().clear();
    }
    for (key, link) in NAV_KEYS.iter().zip(NAV_LINKS.iter()) {
        if is_key_pressed(*key) {
            ctx.navigate(link.path);
        }
    }
}

fn draw_shelf(ctx: &AppContext, elements: &ElementTable) {
    let display = ctx.display();
    for shelf in display.shelves() {
        draw_rectangle(
            shelf.left(),
            shelf.center[1] - SHELF_THICKNESS_PX * 0.5,
            shelf.width,
            SHELF_THICKNESS_PX,
            SHELF_COLOR,
        );
        draw_text(&shelf.label, shelf.left(), shelf.center[1] + 28.0, 18.0, GRAY);
    }

    let radius = display.item_radius();
    for (_, element) in elements.iter() {
        let Some(transform) = element.transform else {
            continue;
        };
        let [x, y] = transform.center(radius);
        draw_cookie(x, y, radius, transform.rotation);
    }

    if let Some(grip) = display.world().and_then(|world| world.grip_point_px()) {
        let (mx, my) = mouse_position();
        draw_line(grip[0], grip[1], mx, my, 2.0, DARKGRAY);
        draw_circle(grip[0], grip[1], 4.0, RED);
    }

    if !display.physics_enabled() {
        draw_text("physics paused", screen_width() - 180.0, 90.0, 22.0, DARKGRAY);
    }
}

fn draw_cookie(x: f32, y: f32, radius: f32, rotation: f32) {
    draw_circle(x, y, radius, COOKIE_COLOR);
    // Chips ride the body's rotation so spin is visible.
    for (offset, distance) in [(0.0, 0.5), (2.1, 0.35), (4.0, 0.6)] {
        let angle = rotation + offset;
        draw_circle(
            x + angle.cos() * radius * distance,
            y + angle.sin() * radius * distance,
            radius * 0.12,
            CHIP_COLOR,
        );
    }
}

fn draw_grid(ctx: &AppContext) {
    let radius = ctx.display().item_radius();
    for (id, [x, y]) in ctx.display().grid_layout() {
        draw_cookie(x, y, radius, 0.0);
        if let Some(item) = ctx.catalog().get(id) {
            let dims = measure_text(&item.name, None, 16, 1.0);
            draw_text(&item.name, x - dims.width * 0.5, y + radius + 20.0, 16.0, DARKGRAY);
            let price = format!("${:.2}", item.price_cents as f64 / 100.0);
            draw_text(&price, x - 20.0, y + radius + 38.0, 16.0, GRAY);
        }
    }
}

fn draw_nav(ctx: &AppContext) {
    let current = ctx.router().current();
    let mut x = 20.0;
    for (idx, link) in NAV_LINKS.iter().enumerate() {
        let color = if link.path == current { BLACK } else { GRAY };
        let label = format!("{} {}", idx + 1, link.name);
        draw_text(&label, x, 32.0, 24.0, color);
        x += measure_text(&label, None, 24, 1.0).width + 28.0;
    }
    let bag = format!("bag ({})", ctx.cart().count());
    draw_text(&bag, screen_width() - 120.0, 32.0, 24.0, BLACK);
}

fn draw_cart(ctx: &AppContext) {
    let cart = ctx.cart();
    if let Some(message) = cart.notification() {
        let dims = measure_text(message, None, 22, 1.0);
        let x = screen_width() * 0.5 - dims.width * 0.5;
        draw_rectangle(x - 12.0, 48.0, dims.width + 24.0, 34.0, BLACK);
        draw_text(message, x, 72.0, 22.0, WHITE);
    }
    if !cart.is_open() {
        return;
    }

    let width = 320.0;
    let x = screen_width() - width;
    draw_rectangle(x, 0.0, width, screen_height(), Color::from_rgba(255, 255, 255, 240));
    draw_text("Your bag", x + 20.0, 40.0, 28.0, BLACK);
    let mut y = 80.0;
    for entry in cart.entries() {
        let line = format!(
            "{} x{}  ${:.2}",
            entry.name,
            entry.quantity,
            entry.subtotal_cents() as f64 / 100.0
        );
        draw_text(&line, x + 20.0, y, 18.0, DARKGRAY);
        y += 26.0;
    }
    let total = format!("total ${:.2}", cart.total_cents() as f64 / 100.0);
    draw_text(&total, x + 20.0, y + 20.0, 22.0, BLACK);
}

fn draw_transition(tiles: &[TransitionTile], (rows, cols): (usize, usize)) {
    if rows == 0 || cols == 0 {
        return;
    }
    let cell_w = screen_width() / cols as f32;
    let cell_h = screen_height() / rows as f32;
    for (idx, tile) in tiles.iter().enumerate() {
        if tile.scale <= 0.0 || tile.opacity <= 0.0 {
            continue;
        }
        let cx = (idx % cols) as f32 * cell_w + cell_w * 0.5;
        let cy = (idx / cols) as f32 * cell_h + cell_h * 0.5;
        let half = cell_w.max(cell_h) * 0.5 * tile.scale;
        let color = Color::new(TILE_COLOR.r, TILE_COLOR.g, TILE_COLOR.b, tile.opacity);
        match tile.shape {
            0 => draw_circle(cx, cy, half, color),
            1 => draw_rectangle(cx - half, cy - half, half * 2.0, half * 2.0, color),
            2 => draw_poly(cx, cy, 6, half, 0.0, color),
            _ => draw_poly(cx, cy, 8, half, 22.5, color),
        }
    }
}

fn draw_help() {
    draw_text(
        "drag cookies | A/right-click add | P physics | S scatter | O organize | G grid | C cart | X clear | 1-4 pages",
        20.0,
        screen_height() - 20.0,
        18.0,
        GRAY,
    );
}
