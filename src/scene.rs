//! The tabletop demo scene.
//!
//! [`Scene`] owns the registry, the asset library and the demo state the
//! key watchers and the debug panel act on: the lighting, the camera entity
//! and the list of objects the keyboard mover can be switched between.

use cgmath::{Matrix3, Matrix4, Rad, SquareMatrix, Vector3};

use crate::{
    behaviour::{BehaviourContext, CameraControl, FollowPath, SimpleMove},
    camera::{self, Camera},
    context::Settings,
    data_structures::{
        material::{Material, ShaderKind},
        mesh::MeshData,
        registry::{Entity, Registry},
        transform::Transform,
        uniform::UniformValue,
    },
    input::{self, InputState, KeyAction, KeyPressWatcher},
    lighting::LightSettings,
    render::{self, DrawBackend, DrawStats, Renderable},
    resources::{
        AssetRoot, Assets, MaterialId, MeshId, ShaderId, TextureId,
        mesh::load_mesh_or_cube,
        texture::{load_cube_map_or, load_texture_or},
    },
    ui::FpsTracker,
};

const SKYBOX_LAYER: i32 = 100;

pub struct Scene {
    pub registry: Registry,
    pub assets: Assets,
    pub fps: FpsTracker,
    lighting: LightSettings,
    lit_shader: ShaderId,
    camera: Entity,
    controllables: Vec<Entity>,
    selected: usize,
    watchers: Vec<KeyPressWatcher>,
}

struct Textures {
    stone: TextureId,
    bottle: TextureId,
    table: TextureId,
    black_chess: TextureId,
    white_chess: TextureId,
    dunce: TextureId,
    cake: TextureId,
    box_diffuse: TextureId,
    stone_specular: TextureId,
    box_reflections: TextureId,
    environment: TextureId,
}

impl Textures {
    async fn load(root: &AssetRoot, assets: &mut Assets) -> Self {
        const GREY: [u8; 4] = [128, 128, 128, 255];
        const WHITE: [u8; 4] = [255, 255, 255, 255];
        Self {
            stone: assets.add_texture(load_texture_or(root, "images/Stone_001_Diffuse.png", GREY).await),
            bottle: assets.add_texture(load_texture_or(root, "images/BottleTex.png", [60, 120, 200, 255]).await),
            table: assets.add_texture(load_texture_or(root, "images/Table.png", [120, 80, 40, 255]).await),
            black_chess: assets.add_texture(load_texture_or(root, "images/blackChess.jpg", [20, 20, 20, 255]).await),
            white_chess: assets.add_texture(load_texture_or(root, "images/whiteChess.jpg", [235, 235, 225, 255]).await),
            dunce: assets.add_texture(load_texture_or(root, "images/SkinPNG.png", [220, 180, 150, 255]).await),
            cake: assets.add_texture(load_texture_or(root, "images/Slice of Cake.png", [240, 200, 210, 255]).await),
            box_diffuse: assets.add_texture(load_texture_or(root, "images/box.bmp", WHITE).await),
            stone_specular: assets.add_texture(load_texture_or(root, "images/Stone_001_Specular.png", GREY).await),
            box_reflections: assets.add_texture(load_texture_or(root, "images/box-reflections.bmp", GREY).await),
            environment: assets.add_texture(
                load_cube_map_or(root, "images/cubemaps/skybox/ocean.jpg", [20, 43, 79, 255]).await,
            ),
        }
    }
}

struct Meshes {
    table: MeshId,
    bottle: MeshId,
    pawn: MeshId,
    dunce: MeshId,
    cake: MeshId,
    skybox: MeshId,
}

impl Meshes {
    async fn load(root: &AssetRoot, assets: &mut Assets) -> Self {
        let mut skybox = MeshData::ico_sphere("skybox", Vector3::new(0.0, 0.0, 0.0), 1.0, 2);
        skybox.invert_faces();
        Self {
            table: assets.add_mesh(load_mesh_or_cube(root, "models/Table.obj").await),
            bottle: assets.add_mesh(load_mesh_or_cube(root, "models/waterBottle.obj").await),
            pawn: assets.add_mesh(load_mesh_or_cube(root, "models/ChessPawn.obj").await),
            dunce: assets.add_mesh(load_mesh_or_cube(root, "models/Dunce.obj").await),
            cake: assets.add_mesh(load_mesh_or_cube(root, "models/SliceofCake.obj").await),
            skybox: assets.add_mesh(skybox),
        }
    }
}

fn environment_rotation(axis: Vector3<f32>) -> Matrix3<f32> {
    Matrix3::from_axis_angle(axis, Rad(std::f32::consts::FRAC_PI_2))
}

/// A textured Blinn-Phong material over the shared secondary and specular maps.
fn textured(name: &str, shader: ShaderId, diffuse: TextureId, textures: &Textures, mix: f32) -> Material {
    Material::new(name, shader)
        .with("s_Diffuse", UniformValue::Texture(diffuse))
        .with("s_Diffuse2", UniformValue::Texture(textures.box_diffuse))
        .with("s_Specular", UniformValue::Texture(textures.stone_specular))
        .with("u_Shininess", 8.0_f32)
        .with("u_TextureMix", mix)
}

fn spawn_prop(
    registry: &mut Registry,
    name: &str,
    renderable: Renderable,
    position: [f32; 3],
    rotation: [f32; 3],
    scale: f32,
) -> Entity {
    let entity = registry.create(name);
    if let Some(transform) = registry.get_mut::<Transform>(entity) {
        transform
            .set_local_position(position)
            .set_local_rotation(rotation[0], rotation[1], rotation[2])
            .set_local_scale([scale; 3]);
    }
    registry.insert(entity, renderable);
    entity
}

impl Scene {
    /// Load the assets under `root` and place the demo objects.
    ///
    /// Missing asset files are replaced by placeholders, so this never fails.
    pub async fn build(root: &AssetRoot, settings: &Settings) -> Self {
        let mut assets = Assets::new();
        let mut registry = Registry::new();
        let lighting = LightSettings::default();

        let lit_shader = assets.add_shader(ShaderKind::BlinnPhongTextured);
        let reflection_shader = assets.add_shader(ShaderKind::Reflection);
        let lit_reflection_shader = assets.add_shader(ShaderKind::BlinnPhongReflection);
        let skybox_shader = assets.add_shader(ShaderKind::Skybox);
        lighting.apply(assets.shader_mut(lit_shader));

        let textures = Textures::load(root, &mut assets).await;
        let meshes = Meshes::load(root, &mut assets).await;

        let _stone = assets.add_material(textured("stone", lit_shader, textures.stone, &textures, 0.5));
        let bottle = assets.add_material(textured("bottle", lit_shader, textures.bottle, &textures, 0.2));
        let table = assets.add_material(textured("table", lit_shader, textures.table, &textures, 0.0));
        let black = assets.add_material(textured("black chess", lit_shader, textures.black_chess, &textures, 0.2));
        let white = assets.add_material(textured("white chess", lit_shader, textures.white_chess, &textures, 0.2));
        let dunce = assets.add_material(textured("dunce", lit_shader, textures.dunce, &textures, 0.0));
        let cake = assets.add_material(textured("cake", lit_shader, textures.cake, &textures, 0.0));

        let mut reflective_stone = textured("reflective stone", lit_reflection_shader, textures.stone, &textures, 0.5)
            .with("s_Reflectivity", UniformValue::Texture(textures.box_reflections))
            .with("s_Environment", UniformValue::CubeMap(textures.environment))
            .with("u_EnvironmentRotation", environment_rotation(Vector3::unit_z()));
        lighting.apply_to_material(&mut reflective_stone);
        assets.add_material(reflective_stone);
        assets.add_material(
            Material::new("mirror", reflection_shader)
                .with("s_Environment", UniformValue::CubeMap(textures.environment))
                .with("u_EnvironmentRotation", environment_rotation(Vector3::unit_x())),
        );
        let skybox = assets.add_material(
            Material::new("skybox", skybox_shader)
                .with_layer(SKYBOX_LAYER)
                .with("s_Environment", UniformValue::CubeMap(textures.environment))
                .with("u_EnvironmentRotation", environment_rotation(Vector3::unit_x())),
        );

        let pawn_scale = 0.15;
        let props = [
            ("Table", meshes.table, table, [0.0, -4.0, -4.0], [90.0, 0.0, 0.0], 2.0),
            ("waterBottle", meshes.bottle, bottle, [3.0, -4.0, 0.5], [90.0, 0.0, 0.0], 1.0),
            ("chessPawn", meshes.pawn, white, [2.0, 0.0, 0.6], [355.0, 0.0, 0.0], pawn_scale),
            ("chessPawn2", meshes.pawn, white, [2.0, -0.6, 0.5], [90.0, 0.0, 0.0], pawn_scale),
            ("chessPawn3", meshes.pawn, black, [-2.0, 0.3, 0.7], [355.0, 0.0, 90.0], pawn_scale),
            ("chessPawn4", meshes.pawn, black, [-2.0, -0.6, 0.5], [90.0, 0.0, 0.0], pawn_scale),
            ("chessPawn5", meshes.pawn, white, [2.0, -1.6, 0.5], [90.0, 0.0, 0.0], pawn_scale),
            ("chessPawn6", meshes.pawn, black, [-2.0, -1.6, 0.5], [90.0, 0.0, 0.0], pawn_scale),
            ("chessPawn7", meshes.pawn, white, [1.3, -1.6, 0.5], [90.0, 0.0, 0.0], pawn_scale),
            ("chessPawn8", meshes.pawn, black, [-1.3, -1.6, 0.5], [90.0, 0.0, 0.0], pawn_scale),
            ("chessPawn9", meshes.pawn, white, [1.3, -0.6, 0.5], [90.0, 0.0, 0.0], pawn_scale),
            ("chessPawn10", meshes.pawn, black, [-1.3, -0.6, 0.5], [90.0, 0.0, 0.0], pawn_scale),
            ("waterBottle2", meshes.bottle, bottle, [-4.0, -4.0, 0.5], [90.0, 0.0, 0.0], 1.0),
            ("cake", meshes.cake, cake, [0.0, -7.0, 1.2], [90.0, 0.0, 0.0], 1.0),
        ];
        for (name, mesh, material, position, rotation, scale) in props {
            let entity = spawn_prop(&mut registry, name, Renderable::new(mesh, material), position, rotation, scale);
            if name != "Table" {
                registry.bind_behaviour(entity, SimpleMove::default(), false);
            }
        }

        let rolling = spawn_prop(
            &mut registry,
            "Rolling Water",
            Renderable::new(meshes.bottle, bottle),
            [-2.0, 0.0, 1.0],
            [0.0, 0.0, 0.0],
            1.0,
        );
        registry.bind_behaviour(
            rolling,
            FollowPath::new(vec![Vector3::new(3.0, 3.0, 1.0), Vector3::new(-3.0, 3.0, 1.0)], 1.0),
            true,
        );

        let jumping = spawn_prop(
            &mut registry,
            "Jumping Dunce",
            Renderable::new(meshes.dunce, dunce),
            [-7.0, -2.0, 3.0],
            [90.0, 0.0, 90.0],
            1.5,
        );
        registry.bind_behaviour(
            jumping,
            FollowPath::new(vec![Vector3::new(-7.0, -2.0, -3.0), Vector3::new(-7.0, -2.0, 2.0)], 3.0),
            true,
        );

        let camera = registry.create("Camera");
        if let Some(transform) = registry.get_mut::<Transform>(camera) {
            transform.set_local_position([0.0, 6.0, 6.0]);
        }
        let mut lens = Camera::new();
        lens.set_up(Vector3::unit_z());
        lens.look_at([0.0, 0.0, 0.0]);
        lens.set_fov_degrees(90.0);
        lens.set_ortho_height(3.0);
        lens.resize_window(settings.width, settings.height);
        registry.insert(camera, lens);
        registry.bind_behaviour(
            camera,
            CameraControl {
                look_speed: settings.mouse_sensitivity,
                ..CameraControl::default()
            },
            true,
        );

        spawn_prop(
            &mut registry,
            "skybox",
            Renderable::new(meshes.skybox, skybox),
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
            1.0,
        );

        let controllables: Vec<Entity> = ["waterBottle", "chessPawn"]
            .into_iter()
            .filter_map(|name| registry.find_by_name(name))
            .collect();
        if let Some(&first) = controllables.first() {
            registry.set_behaviour_enabled::<SimpleMove>(first, true);
        }

        registry.aim_cameras();
        registry.update_transforms();
        log::info!(
            "Scene built: {} entities, {} materials, {} meshes, {} textures",
            registry.len(),
            assets.materials().count(),
            assets.meshes().count(),
            assets.textures().count()
        );

        Self {
            registry,
            assets,
            fps: FpsTracker::default(),
            lighting,
            lit_shader,
            camera,
            controllables,
            selected: 0,
            watchers: input::default_watchers(),
        }
    }

    pub fn camera(&self) -> Entity {
        self.camera
    }

    pub fn lit_shader(&self) -> ShaderId {
        self.lit_shader
    }

    pub fn lighting(&self) -> &LightSettings {
        &self.lighting
    }

    /// Replace the lighting and push it to the lit program.
    pub fn set_lighting(&mut self, lighting: LightSettings) {
        lighting.apply(self.assets.shader_mut(self.lit_shader));
        self.lighting = lighting;
    }

    pub fn controllables(&self) -> &[Entity] {
        &self.controllables
    }

    pub fn selected_controllable(&self) -> Option<Entity> {
        self.controllables.get(self.selected).copied()
    }

    /// Simulation half of a frame: key watchers, behaviours, then world transforms.
    ///
    /// Watchers are skipped while the debug UI has keyboard focus.
    pub fn update(&mut self, dt: f32, input: &InputState, keyboard_captured: bool) {
        self.fps.push(dt);
        if !keyboard_captured {
            let fired: Vec<KeyAction> = self
                .watchers
                .iter_mut()
                .filter_map(|watcher| watcher.poll(input))
                .collect();
            for action in fired {
                self.apply_key_action(action);
            }
        }
        self.registry.run_behaviours(&BehaviourContext { dt, input });
        self.registry.aim_cameras();
        self.registry.update_transforms();
    }

    pub fn apply_key_action(&mut self, action: KeyAction) {
        log::debug!("Key action {action:?}");
        match action {
            KeyAction::ToggleOrtho => {
                if let Some(camera) = self.registry.get_mut::<Camera>(self.camera) {
                    camera.toggle_ortho();
                }
            }
            KeyAction::NextControllable => self.cycle_controllable(1),
            KeyAction::PreviousControllable => self.cycle_controllable(-1),
            KeyAction::ToggleRelative => {
                if let Some(mover) = self
                    .selected_controllable()
                    .and_then(|entity| self.registry.behaviour_mut::<SimpleMove>(entity))
                {
                    mover.relative = !mover.relative;
                }
            }
        }
    }

    fn cycle_controllable(&mut self, step: isize) {
        let count = self.controllables.len();
        if count == 0 {
            return;
        }
        let current = self.controllables[self.selected];
        self.registry.set_behaviour_enabled::<SimpleMove>(current, false);
        self.selected = (self.selected as isize + step).rem_euclid(count as isize) as usize;
        let next = self.controllables[self.selected];
        self.registry.set_behaviour_enabled::<SimpleMove>(next, true);
        log::info!("Controlling {}", self.registry.name(next).unwrap_or("<unnamed>"));
    }

    /// Update every camera's aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        for (_, camera) in self.registry.view_mut::<Camera>() {
            camera.resize_window(width, height);
        }
    }

    /// View and projection of the scene camera; identity when it is gone.
    pub fn view_projection(&self) -> (Matrix4<f32>, Matrix4<f32>) {
        let view = self
            .registry
            .get::<Transform>(self.camera)
            .map(|transform| camera::view_matrix(transform.world_transform()))
            .unwrap_or_else(Matrix4::identity);
        let projection = self
            .registry
            .get::<Camera>(self.camera)
            .map(Camera::projection)
            .unwrap_or_else(Matrix4::identity);
        (view, projection)
    }

    /// Draw half of a frame: sort the drawables and feed them to `backend`.
    pub fn render(&mut self, backend: &mut impl DrawBackend) -> DrawStats {
        render::sort_drawables(&mut self.registry, &self.assets);
        let (view, projection) = self.view_projection();
        render::draw_all(&self.registry, &self.assets, view, projection, backend)
    }

    pub fn material_named(&self, name: &str) -> Option<MaterialId> {
        self.assets.find_material(name)
    }
}
