//! GLSL sources for the four programs of the frame.

pub const SCENE_VERTEX: &str = r#"
#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aNormal;
layout (location = 2) in vec2 aTexCoords;

out vec3 FragPos;
out vec3 Normal;
out vec2 TexCoords;

uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;

void main()
{
    FragPos = vec3(model * vec4(aPos, 1.0));
    Normal = mat3(transpose(inverse(model))) * aNormal;
    TexCoords = aTexCoords;
    gl_Position = projection * view * vec4(FragPos, 1.0);
}
"#;

pub const SCENE_FRAGMENT: &str = r#"
#version 330 core
layout (location = 0) out vec4 FragColor;
layout (location = 1) out vec4 BrightColor;

struct Material {
    sampler2D texture_diffuse1;
    sampler2D texture_specular1;
    float shininess;
};

struct DirLight {
    vec3 direction;
    vec3 ambient;
    vec3 diffuse;
    vec3 specular;
};

struct PointLight {
    vec3 position;
    float constant;
    float linear;
    float quadratic;
    vec3 ambient;
    vec3 diffuse;
    vec3 specular;
};

struct SpotLight {
    vec3 position;
    vec3 direction;
    float cutOff;
    float outerCutOff;
    float constant;
    float linear;
    float quadratic;
    vec3 ambient;
    vec3 diffuse;
    vec3 specular;
};

#define NR_POINT_LIGHTS 3

in vec3 FragPos;
in vec3 Normal;
in vec2 TexCoords;

uniform vec3 viewPosition;
uniform DirLight dirLight;
uniform PointLight pointLights[NR_POINT_LIGHTS];
uniform SpotLight spotLight;
uniform Material material;
uniform bool blinn;
uniform bool spotEnabled;
uniform float bloomThreshold;

float specularFactor(vec3 normal, vec3 lightDir, vec3 viewDir)
{
    if (blinn) {
        vec3 halfwayDir = normalize(lightDir + viewDir);
        return pow(max(dot(normal, halfwayDir), 0.0), material.shininess);
    }

    vec3 reflectDir = reflect(-lightDir, normal);
    return pow(max(dot(viewDir, reflectDir), 0.0), material.shininess);
}

vec3 shade(vec3 lightDir, vec3 ambient, vec3 diffuse, vec3 specular, vec3 normal, vec3 viewDir,
           vec3 albedo, vec3 specularMap, float falloff, float cone)
{
    float diff = max(dot(normal, lightDir), 0.0);
    float spec = specularFactor(normal, lightDir, viewDir);

    vec3 a = ambient * albedo;
    vec3 d = diffuse * diff * albedo;
    vec3 s = specular * spec * specularMap;

    return (a + (d + s) * cone) * falloff;
}

float attenuate(float constant, float linear, float quadratic, vec3 position)
{
    float distance = length(position - FragPos);
    return 1.0 / (constant + linear * distance + quadratic * (distance * distance));
}

void main()
{
    vec3 normal = normalize(Normal);
    vec3 viewDir = normalize(viewPosition - FragPos);
    vec3 albedo = texture(material.texture_diffuse1, TexCoords).rgb;
    vec3 specularMap = texture(material.texture_specular1, TexCoords).rgb;

    vec3 result = shade(normalize(-dirLight.direction), dirLight.ambient, dirLight.diffuse,
                        dirLight.specular, normal, viewDir, albedo, specularMap, 1.0, 1.0);

    for (int i = 0; i < NR_POINT_LIGHTS; i++) {
        PointLight light = pointLights[i];
        float falloff = attenuate(light.constant, light.linear, light.quadratic, light.position);
        result += shade(normalize(light.position - FragPos), light.ambient, light.diffuse,
                        light.specular, normal, viewDir, albedo, specularMap, falloff, 1.0);
    }

    if (spotEnabled) {
        vec3 lightDir = normalize(spotLight.position - FragPos);
        float theta = dot(lightDir, normalize(-spotLight.direction));
        float epsilon = spotLight.cutOff - spotLight.outerCutOff;
        float cone = clamp((theta - spotLight.outerCutOff) / epsilon, 0.0, 1.0);
        float falloff = attenuate(spotLight.constant, spotLight.linear, spotLight.quadratic,
                                  spotLight.position);
        result += shade(lightDir, spotLight.ambient, spotLight.diffuse, spotLight.specular,
                        normal, viewDir, albedo, specularMap, falloff, cone);
    }

    FragColor = vec4(result, 1.0);

    float brightness = dot(result, vec3(0.2126, 0.7152, 0.0722));
    if (brightness > bloomThreshold)
        BrightColor = vec4(result, 1.0);
    else
        BrightColor = vec4(0.0, 0.0, 0.0, 1.0);
}
"#;

pub const SKYBOX_VERTEX: &str = r#"
#version 330 core
layout (location = 0) in vec3 aPos;

out vec3 TexCoords;

uniform mat4 view;
uniform mat4 projection;

void main()
{
    TexCoords = aPos;
    vec4 pos = projection * view * vec4(aPos, 1.0);
    gl_Position = pos.xyww;
}
"#;

pub const SKYBOX_FRAGMENT: &str = r#"
#version 330 core
layout (location = 0) out vec4 FragColor;
layout (location = 1) out vec4 BrightColor;

in vec3 TexCoords;

uniform samplerCube skybox;

void main()
{
    FragColor = texture(skybox, TexCoords);
    BrightColor = vec4(0.0, 0.0, 0.0, 1.0);
}
"#;

pub const SCREEN_VERTEX: &str = r#"
#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 2) in vec2 aTexCoords;

out vec2 TexCoords;

void main()
{
    TexCoords = aTexCoords;
    gl_Position = vec4(aPos, 1.0);
}
"#;

pub const BLUR_FRAGMENT: &str = r#"
#version 330 core
out vec4 FragColor;

in vec2 TexCoords;

uniform sampler2D image;
uniform bool horizontal;
uniform float weight[5];

void main()
{
    vec2 texelSize = 1.0 / textureSize(image, 0);
    vec3 result = texture(image, TexCoords).rgb * weight[0];

    if (horizontal) {
        for (int i = 1; i < 5; ++i) {
            result += texture(image, TexCoords + vec2(texelSize.x * i, 0.0)).rgb * weight[i];
            result += texture(image, TexCoords - vec2(texelSize.x * i, 0.0)).rgb * weight[i];
        }
    } else {
        for (int i = 1; i < 5; ++i) {
            result += texture(image, TexCoords + vec2(0.0, texelSize.y * i)).rgb * weight[i];
            result += texture(image, TexCoords - vec2(0.0, texelSize.y * i)).rgb * weight[i];
        }
    }

    FragColor = vec4(result, 1.0);
}
"#;

pub const COMPOSITE_FRAGMENT: &str = r#"
#version 330 core
out vec4 FragColor;

in vec2 TexCoords;

uniform sampler2D scene;
uniform sampler2D bloomBlur;
uniform bool hdr;
uniform bool bloom;
uniform float exposure;
uniform float gamma;

void main()
{
    vec3 color = texture(scene, TexCoords).rgb;

    if (!hdr) {
        FragColor = vec4(color, 1.0);
        return;
    }

    if (bloom)
        color += texture(bloomBlur, TexCoords).rgb;

    vec3 exposed = color * exposure;
    vec3 mapped = exposed / (exposed + vec3(1.0));
    mapped = pow(mapped, vec3(1.0 / gamma));

    FragColor = vec4(mapped, 1.0);
}
"#;
